/// In-process mock backend for integration tests.
/// Serves the pull endpoints and the push channel the client talks to,
/// with scriptable state so tests can stage snapshots and push frames.

use actix::prelude::*;
use actix_web::{web, App, Error, HttpRequest, HttpResponse, HttpServer};
use actix_web_actors::ws;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Shared backend state, scripted by tests.
#[derive(Default)]
pub struct TestBackend {
    /// username -> password
    pub users: Mutex<HashMap<String, String>>,
    /// Snapshot served by the chat-list endpoint, as raw JSON.
    pub chats: Mutex<Vec<Value>>,
    /// chat_id -> history served by the message endpoint.
    pub messages: Mutex<HashMap<String, Vec<Value>>>,
    /// Every frame received over any push channel.
    pub received: Mutex<Vec<Value>>,
    /// Live push-channel sessions, keyed by token.
    pub connections: Mutex<HashMap<String, Addr<WsSession>>>,
    /// When set, both pull endpoints answer 500.
    pub fail_pulls: Mutex<bool>,
    next_chat: Mutex<u32>,
}

/// Token minted by the mock login endpoint.
pub fn token_for(username: &str) -> String {
    format!("token-{}", username)
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn register(
    state: web::Data<TestBackend>,
    body: web::Json<Credentials>,
) -> HttpResponse {
    let mut users = state.users.lock().unwrap();
    if users.contains_key(&body.username) {
        return HttpResponse::BadRequest().json(json!({"detail": "Username already taken"}));
    }
    users.insert(body.username.clone(), body.password.clone());
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

async fn login(state: web::Data<TestBackend>, body: web::Json<Credentials>) -> HttpResponse {
    let users = state.users.lock().unwrap();
    if users.get(&body.username) == Some(&body.password) {
        HttpResponse::Ok().json(json!({
            "username": body.username.clone(),
            "token": token_for(&body.username),
        }))
    } else {
        HttpResponse::Unauthorized().json(json!({"detail": "Invalid username or password"}))
    }
}

async fn user_chats(state: web::Data<TestBackend>, _path: web::Path<String>) -> HttpResponse {
    if *state.fail_pulls.lock().unwrap() {
        return HttpResponse::InternalServerError().json(json!({"detail": "Snapshot unavailable"}));
    }
    HttpResponse::Ok().json(state.chats.lock().unwrap().clone())
}

async fn chat_messages(state: web::Data<TestBackend>, path: web::Path<String>) -> HttpResponse {
    if *state.fail_pulls.lock().unwrap() {
        return HttpResponse::InternalServerError().json(json!({"detail": "Snapshot unavailable"}));
    }
    let messages = state.messages.lock().unwrap();
    HttpResponse::Ok().json(messages.get(path.as_str()).cloned().unwrap_or_default())
}

async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<String>,
    state: web::Data<TestBackend>,
) -> Result<HttpResponse, Error> {
    ws::start(
        WsSession {
            token: path.into_inner(),
            state: state.clone(),
        },
        &req,
        stream,
    )
}

/// Frame pushed to a connected session.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Push(pub String);

/// One push-channel session on the mock backend.
pub struct WsSession {
    token: String,
    state: web::Data<TestBackend>,
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.state
            .connections
            .lock()
            .unwrap()
            .insert(self.token.clone(), ctx.address());
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.state.connections.lock().unwrap().remove(&self.token);
    }
}

impl Handler<Push> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Push, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let text = match msg {
            Ok(ws::Message::Text(text)) => text,
            Ok(ws::Message::Ping(bytes)) => {
                ctx.pong(&bytes);
                return;
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                return;
            }
            _ => return,
        };

        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) => return,
        };
        self.state.received.lock().unwrap().push(value.clone());

        match value.get("type").and_then(Value::as_str) {
            Some("create_chat") => {
                let chat_id = {
                    let mut next = self.state.next_chat.lock().unwrap();
                    *next += 1;
                    format!("chat-{}", *next)
                };

                let mut reply = json!({"type": "chat_created", "chat_id": chat_id.clone()});
                let mut summary = json!({"chat_id": chat_id, "last_message": ""});
                for key in ["participant", "participants", "is_group"] {
                    if let Some(field) = value.get(key) {
                        reply[key] = field.clone();
                        summary[key] = field.clone();
                    }
                }
                self.state.chats.lock().unwrap().push(summary);

                // Only the initiator hears about the new chat directly.
                ctx.text(reply.to_string());
            }
            Some("send_message") => {
                let chat_id = value
                    .get("chat_id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let sender = value
                    .get("sender")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let message = value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();

                self.state
                    .messages
                    .lock()
                    .unwrap()
                    .entry(chat_id.clone())
                    .or_default()
                    .push(json!({"sender": sender.clone(), "message": message.clone()}));

                // Broadcast to every connected session, the sender included.
                let frame = json!({
                    "type": "new_message",
                    "chat_id": chat_id,
                    "sender": sender,
                    "message": message,
                })
                .to_string();
                let connections = self.state.connections.lock().unwrap();
                for addr in connections.values() {
                    addr.do_send(Push(frame.clone()));
                }
            }
            _ => {}
        }
    }
}

/// Spawn the mock backend on a random port. Returns the shared state and
/// the bind address (`host:port`).
pub fn spawn_backend() -> (web::Data<TestBackend>, String) {
    let state = web::Data::new(TestBackend::default());
    let app_state = state.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/user-chats/{username}", web::get().to(user_chats))
            .route("/chat-messages/{chat_id}", web::get().to(chat_messages))
            .route("/ws/{token}", web::get().to(ws_connect))
    })
    .workers(1)
    .bind("127.0.0.1:0")
    .expect("Failed to bind test backend");

    let addr = server
        .addrs()
        .first()
        .expect("No bind address for test backend")
        .to_string();

    tokio::spawn(server.run());

    (state, addr)
}

/// Push a raw frame to the session connected with `token`.
pub fn push_frame(state: &web::Data<TestBackend>, token: &str, frame: &str) {
    let connections = state.connections.lock().unwrap();
    let addr = connections
        .get(token)
        .unwrap_or_else(|| panic!("no connection for {}", token));
    addr.do_send(Push(frame.to_string()));
}

/// Wait until the session with `token` has its push channel up.
pub async fn wait_for_connection(state: &web::Data<TestBackend>, token: &str) {
    for _ in 0..100 {
        if state.connections.lock().unwrap().contains_key(token) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("session {} never connected", token);
}

/// Stage a registered user so tests can log straight in.
pub fn seed_user(state: &web::Data<TestBackend>, username: &str, password: &str) {
    state
        .users
        .lock()
        .unwrap()
        .insert(username.to_string(), password.to_string());
}
