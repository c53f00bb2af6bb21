use axum::{
    Router,
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use pictionary::messages::{
    GameSnapshot, Line, Phase, ServerMessage, StrokeEvent, StrokeStart,
};
use pictionary::{
    Identity, InputCommand, LineCanvas, Participant, Presenter, Session, SessionConfig,
    SessionError, View,
};
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use url::Url;

const WAIT: Duration = Duration::from_secs(5);

/// What the fake server observed from its clients.
#[derive(Debug)]
pub enum ServerEvent {
    Connected { id: String, name: String },
    Frame(serde_json::Value),
    Disconnected,
}

#[derive(Debug, Clone)]
enum Push {
    Text(String),
    Close,
}

#[derive(Clone)]
struct Shared {
    events: mpsc::UnboundedSender<ServerEvent>,
    push: broadcast::Sender<Push>,
}

/// In-process game server stand-in. Frames pushed by the test go to every
/// connected client.
pub struct FakeServer {
    pub url: Url,
    events: mpsc::UnboundedReceiver<ServerEvent>,
    push: broadcast::Sender<Push>,
}

pub async fn spawn_fake_server() -> FakeServer {
    let (events_tx, events) = mpsc::unbounded_channel();
    let (push, _) = broadcast::channel(64);
    let shared = Shared {
        events: events_tx,
        push: push.clone(),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let app = Router::new()
            .route("/ws", get(ws_handler))
            .with_state(shared);
        axum::serve(listener, app).await.unwrap();
    });

    FakeServer {
        url: Url::parse(&format!("ws://{}/ws", addr)).unwrap(),
        events,
        push,
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HashMap<String, String>>,
    State(shared): State<Shared>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, params, shared))
}

async fn handle_socket(socket: WebSocket, params: HashMap<String, String>, shared: Shared) {
    let mut push = shared.push.subscribe();
    let _ = shared.events.send(ServerEvent::Connected {
        id: params.get("id").cloned().unwrap_or_default(),
        name: params.get("name").cloned().unwrap_or_default(),
    });

    let (mut sender, mut receiver) = socket.split();
    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let value = serde_json::from_str(&text)
                        .unwrap_or(serde_json::Value::String(text));
                    let _ = shared.events.send(ServerEvent::Frame(value));
                }
                Some(Ok(_)) => continue,
                _ => break,
            },
            pushed = push.recv() => match pushed {
                Ok(Push::Text(text)) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(Push::Close) | Err(_) => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            },
        }
    }

    let _ = shared.events.send(ServerEvent::Disconnected);
}

impl FakeServer {
    pub async fn next_event(&mut self) -> ServerEvent {
        timeout(WAIT, self.events.recv())
            .await
            .expect("Timed out waiting for the client")
            .expect("Fake server stopped")
    }

    pub async fn expect_connected(&mut self) -> (String, String) {
        match self.next_event().await {
            ServerEvent::Connected { id, name } => (id, name),
            other => panic!("Expected a connection, got {:?}", other),
        }
    }

    pub async fn expect_frame(&mut self) -> serde_json::Value {
        match self.next_event().await {
            ServerEvent::Frame(value) => value,
            other => panic!("Expected a frame, got {:?}", other),
        }
    }

    pub async fn expect_disconnected(&mut self) {
        match self.next_event().await {
            ServerEvent::Disconnected => {}
            other => panic!("Expected a disconnect, got {:?}", other),
        }
    }

    /// Accept the next client and consume its join frame. Returns the client's id.
    pub async fn accept_join(&mut self) -> String {
        let (id, _) = self.expect_connected().await;
        assert_eq!(self.expect_frame().await, serde_json::json!({"type": "join"}));
        id
    }

    pub fn push(&self, msg: &ServerMessage) {
        self.push_raw(serde_json::to_string(msg).unwrap());
    }

    pub fn push_raw(&self, text: impl Into<String>) {
        let _ = self.push.send(Push::Text(text.into()));
    }

    pub fn close_all(&self) {
        let _ = self.push.send(Push::Close);
    }
}

pub fn participant(id: &str, name: &str, score: u32) -> Participant {
    Participant {
        id: id.to_string(),
        name: name.to_string(),
        score,
    }
}

pub fn snapshot(phase: Phase, players: Vec<Participant>) -> GameSnapshot {
    GameSnapshot {
        phase,
        round: 0,
        max_rounds: 3,
        players: players.into_iter().collect(),
        current_drawer_id: None,
        current_word: None,
        round_duration_seconds: None,
    }
}

pub fn waiting(players: Vec<Participant>) -> ServerMessage {
    ServerMessage::GameState(snapshot(Phase::Waiting, players))
}

pub fn drawing(
    round: u32,
    drawer: &str,
    word: &str,
    seconds: u32,
    players: Vec<Participant>,
) -> ServerMessage {
    ServerMessage::GameState(GameSnapshot {
        round,
        current_drawer_id: Some(drawer.to_string()),
        current_word: Some(word.to_string()),
        round_duration_seconds: Some(seconds),
        ..snapshot(Phase::Drawing, players)
    })
}

pub fn round_end(round: u32, word: &str, players: Vec<Participant>) -> ServerMessage {
    ServerMessage::GameState(GameSnapshot {
        round,
        current_word: Some(word.to_string()),
        ..snapshot(Phase::RoundEnd, players)
    })
}

pub fn game_end(round: u32, players: Vec<Participant>) -> ServerMessage {
    ServerMessage::GameState(GameSnapshot {
        round,
        ..snapshot(Phase::GameEnd, players)
    })
}

pub fn stroke_begin(x: f32, y: f32) -> StrokeEvent {
    StrokeEvent::Begin(StrokeStart {
        x,
        y,
        color: "#000".to_string(),
        width: 5,
    })
}

pub fn stroke_segment(from: (f32, f32), to: (f32, f32)) -> StrokeEvent {
    StrokeEvent::Segment(Line {
        from_x: from.0,
        from_y: from.1,
        to_x: to.0,
        to_y: to.1,
        color: "#000".to_string(),
        width: 5,
    })
}

/// What the presenter was handed on one render.
#[derive(Debug, Clone)]
pub struct Frame {
    pub view: View,
    pub lines: usize,
}

pub struct RecordingPresenter(mpsc::UnboundedSender<Frame>);

impl Presenter<LineCanvas> for RecordingPresenter {
    fn render(&mut self, view: &View, surface: &LineCanvas) {
        let _ = self.0.send(Frame {
            view: view.clone(),
            lines: surface.lines().len(),
        });
    }
}

pub struct TestClient {
    pub input: mpsc::UnboundedSender<InputCommand>,
    pub frames: mpsc::UnboundedReceiver<Frame>,
    pub handle: JoinHandle<Result<(), SessionError>>,
    pub id: String,
}

impl TestClient {
    /// Skip renders until one matches `pred`.
    pub async fn wait_for(&mut self, pred: impl Fn(&Frame) -> bool) -> Frame {
        timeout(WAIT, async {
            loop {
                let frame = self.frames.recv().await.expect("Session stopped rendering");
                if pred(&frame) {
                    return frame;
                }
            }
        })
        .await
        .expect("Timed out waiting for a matching render")
    }

    pub fn send(&self, command: InputCommand) {
        self.input.send(command).unwrap();
    }
}

pub fn start_client(url: &Url, name: &str, reconnect_attempts: u32) -> TestClient {
    let identity = Identity::new(name).unwrap();
    let id = identity.id.clone();
    let (input, input_rx) = mpsc::unbounded_channel();
    let (frames_tx, frames) = mpsc::unbounded_channel();

    let config = SessionConfig {
        server_url: url.clone(),
        reconnect_attempts,
        reconnect_delay: Duration::from_millis(50),
    };
    let session = Session::new(
        config,
        identity,
        LineCanvas::new(),
        RecordingPresenter(frames_tx),
    );
    let handle = tokio::spawn(session.run(input_rx));

    TestClient {
        input,
        frames,
        handle,
        id,
    }
}
