//! HTTP client tests against a loopback server

use cambium_agent::core::config::ServiceConfig;
use cambium_agent::core::error::AgentError;
use cambium_agent::observation::Observation;
use cambium_agent::reward::{CurrentState, RewardEvent};
use cambium_agent::service::client::{DecisionService, HttpService, TelemetrySink};
use cambium_agent::service::spaces::ActionSpaceConfig;
use cambium_agent::service::wire::{PredictRequest, RewardBatch};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

enum Reply {
    Ok(&'static str),
    Status(u16),
    Stall(Duration),
}

/// Serve exactly one request; the raw request text is sent back on the channel
fn serve_once(reply: Reply) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        let _ = tx.send(request);

        let response = match reply {
            Reply::Ok(body) => format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            ),
            Reply::Status(code) => format!(
                "HTTP/1.1 {} Error\r\ncontent-length: 4\r\nconnection: close\r\n\r\noops",
                code
            ),
            Reply::Stall(delay) => {
                thread::sleep(delay);
                return;
            }
        };
        let _ = stream.write_all(response.as_bytes());
    });

    (format!("http://{}", addr), rx)
}

fn read_request(stream: &mut impl Read) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = stream.read(&mut buf).unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&data);
        if let Some(split) = text.find("\r\n\r\n") {
            let length = text[..split]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= split + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

fn service(base_url: String, timeout_ms: u64) -> HttpService {
    HttpService::new(&ServiceConfig {
        base_url,
        connect_timeout_ms: timeout_ms,
        read_timeout_ms: timeout_ms,
        ..ServiceConfig::default()
    })
    .unwrap()
}

#[test]
fn test_predict_round_trip() {
    let (url, requests) = serve_once(Reply::Ok(
        r#"{"action": {"movement": 4, "jump": true}, "tick_rate": 20.0}"#,
    ));
    let client = service(url, 2_000);
    let observation = Observation::default();
    let action_space = ActionSpaceConfig::default();
    let request = PredictRequest {
        observation: &observation,
        action_space: &action_space,
        bot_name: "alpha",
    };

    let response = client.predict("v1", &request).unwrap();
    assert_eq!(response.action.movement, Some(4));
    assert_eq!(response.action.jump, Some(true));
    assert_eq!(response.tick_rate, Some(20.0));

    let raw = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(raw.starts_with("POST /predict-action/v1 "));
    assert!(raw.contains(r#""bot_name":"alpha""#));
    assert!(raw.contains(r#""enableMovement":true"#));
}

#[test]
fn test_non_success_status_is_an_error() {
    let (url, _requests) = serve_once(Reply::Status(500));
    let client = service(url, 2_000);

    match client.model() {
        Err(AgentError::RemoteStatus { status, endpoint, body }) => {
            assert_eq!(status, 500);
            assert_eq!(endpoint, "/set-model");
            assert_eq!(body, "oops");
        }
        other => panic!("expected RemoteStatus, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_stalled_service_times_out() {
    let (url, _requests) = serve_once(Reply::Stall(Duration::from_millis(1_500)));
    let client = service(url, 200);

    let started = std::time::Instant::now();
    let result = client.action_space();
    assert!(matches!(result, Err(AgentError::Transport(_))));
    assert!(started.elapsed() < Duration::from_millis(1_200));
}

#[test]
fn test_reward_batch_posted() {
    let (url, requests) = serve_once(Reply::Ok(r#"{"status": "ok"}"#));
    let client = service(url, 2_000);
    let events = vec![RewardEvent::damage_taken(3.0, 20.0, Some("alice".into()))];
    let state = CurrentState {
        player: Default::default(),
    };
    let batch = RewardBatch {
        bot_name: "alpha",
        events: &events,
        current_state: &state,
    };

    client.add_reward(&batch).unwrap();
    let raw = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(raw.starts_with("POST /add-reward/ "));
    assert!(raw.contains(r#""type":"damage_taken""#));
    assert!(raw.contains(r#""attacker":"alice""#));
}

#[test]
fn test_space_documents_fetched() {
    let (url, requests) = serve_once(Reply::Ok(r#"{"maxEntities": 4, "includeBlockData": false}"#));
    let client = service(url, 2_000);
    let space = client.observation_space().unwrap();
    assert_eq!(space.max_entities, 4);
    assert!(!space.include_block_data);
    assert_eq!(space.max_blocks, 50);
    let raw = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(raw.starts_with("GET /set-observation-space "));
}
