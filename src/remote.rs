//! MQTT remote control
//!
//! Subscribes to a topic and turns each message into a command for the
//! render loop: play/pause, wind direction, sky color. Messages are plain
//! text (`wind 45`) or JSON (`{"command": "wind", "degrees": 45}`).

use crate::color::Rgba;
use crate::error::{CloudError, Result};
use rumqttc::{Client, Connection, Event, MqttOptions, Packet, QoS};
use serde::Deserialize;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 1883;
pub const DEFAULT_TOPIC: &str = "cumulus";

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCommand {
    Play,
    Pause,
    Toggle,
    /// Wind direction in degrees
    Wind(f32),
    Sky(Rgba),
}

#[derive(Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
enum JsonCommand {
    Play,
    Pause,
    Toggle,
    Wind { degrees: f32 },
    Sky { color: Rgba },
}

impl From<JsonCommand> for RemoteCommand {
    fn from(cmd: JsonCommand) -> Self {
        match cmd {
            JsonCommand::Play => Self::Play,
            JsonCommand::Pause => Self::Pause,
            JsonCommand::Toggle => Self::Toggle,
            JsonCommand::Wind { degrees } => Self::Wind(degrees),
            JsonCommand::Sky { color } => Self::Sky(color),
        }
    }
}

/// Parse one message payload. Returns None for anything unrecognized.
pub fn parse_command(text: &str) -> Option<RemoteCommand> {
    let text = text.trim();
    if text.starts_with('{') {
        return serde_json::from_str::<JsonCommand>(text)
            .map(RemoteCommand::from)
            .ok();
    }

    let (word, rest) = match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    };

    match word.to_lowercase().as_str() {
        "play" | "run" | "start" if rest.is_empty() => Some(RemoteCommand::Play),
        "pause" | "stop" if rest.is_empty() => Some(RemoteCommand::Pause),
        "toggle" if rest.is_empty() => Some(RemoteCommand::Toggle),
        "wind" => rest
            .trim_end_matches('°')
            .parse()
            .ok()
            .map(RemoteCommand::Wind),
        "sky" => rest.parse().ok().map(RemoteCommand::Sky),
        _ => None,
    }
}

/// MQTT client that receives commands in a background thread
pub struct MqttRemote {
    receiver: Receiver<RemoteCommand>,
    _thread: thread::JoinHandle<()>,
}

impl MqttRemote {
    /// Connect to the broker and subscribe to `topic`.
    /// Fails immediately if the connection cannot be established.
    pub fn connect(host: &str, port: u16, topic: &str) -> Result<Self> {
        let topic = if topic.is_empty() { DEFAULT_TOPIC } else { topic };

        let mut options = MqttOptions::new("cumulus", host, port);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut connection) = Client::new(options, 10);

        client.subscribe(topic, QoS::AtMostOnce).map_err(|e| {
            CloudError::Remote(format!("failed to subscribe to topic '{}': {}", topic, e))
        })?;

        // Poll once so an unreachable broker fails here, not in the thread
        match connection.iter().next() {
            Some(Ok(_)) => {},
            Some(Err(e)) => {
                return Err(CloudError::Remote(format!(
                    "failed to connect to MQTT broker at {}:{} - {}",
                    host, port, e
                )));
            },
            None => {
                return Err(CloudError::Remote(format!(
                    "failed to connect to MQTT broker at {}:{} - connection closed",
                    host, port
                )));
            },
        }

        let (sender, receiver) = mpsc::channel();
        let topic_owned = topic.to_string();

        let handle = thread::spawn(move || {
            // the event loop stops once every client handle is dropped
            let _client = client;
            Self::message_loop(connection, &sender, &topic_owned);
        });

        log::info!("MQTT: connected to {}:{}, subscribed to '{}'", host, port, topic);

        Ok(Self {
            receiver,
            _thread: handle,
        })
    }

    fn message_loop(mut connection: Connection, sender: &Sender<RemoteCommand>, topic: &str) {
        for event in connection.iter() {
            match event {
                Ok(Event::Incoming(Packet::Publish(publish))) if publish.topic == topic => {
                    let Ok(text) = std::str::from_utf8(&publish.payload) else {
                        log::warn!("MQTT: ignoring non-UTF-8 payload");
                        continue;
                    };
                    match parse_command(text) {
                        Some(cmd) => {
                            if sender.send(cmd).is_err() {
                                // Render loop gone
                                break;
                            }
                        },
                        None => log::warn!("MQTT: unrecognized command {:?}", text.trim()),
                    }
                },
                Ok(_) => {},
                Err(e) => {
                    // Keep polling; the event loop reconnects on its own
                    log::warn!("MQTT error: {}", e);
                    thread::sleep(Duration::from_secs(1));
                },
            }
        }
    }

    /// Commands received since the last poll, oldest first (non-blocking)
    pub fn poll(&self) -> Vec<RemoteCommand> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_words() {
        assert_eq!(parse_command("play"), Some(RemoteCommand::Play));
        assert_eq!(parse_command("  PAUSE \n"), Some(RemoteCommand::Pause));
        assert_eq!(parse_command("stop"), Some(RemoteCommand::Pause));
        assert_eq!(parse_command("toggle"), Some(RemoteCommand::Toggle));
        assert_eq!(parse_command("play now"), None);
    }

    #[test]
    fn test_parse_wind() {
        assert_eq!(parse_command("wind 90"), Some(RemoteCommand::Wind(90.0)));
        assert_eq!(parse_command("wind -45.5°"), Some(RemoteCommand::Wind(-45.5)));
        assert_eq!(parse_command("wind"), None);
        assert_eq!(parse_command("wind east"), None);
    }

    #[test]
    fn test_parse_sky() {
        assert_eq!(parse_command("sky skyblue"), Some(RemoteCommand::Sky(Rgba::SKY_BLUE)));
        assert_eq!(
            parse_command("sky rgba(10, 20, 30, 0.5)"),
            Some(RemoteCommand::Sky(Rgba::new(10, 20, 30, 0.5)))
        );
    }

    #[test]
    fn test_parse_json() {
        assert_eq!(
            parse_command(r#"{"command": "wind", "degrees": 180}"#),
            Some(RemoteCommand::Wind(180.0))
        );
        assert_eq!(parse_command(r#"{"command": "play"}"#), Some(RemoteCommand::Play));
        assert_eq!(
            parse_command(r#"{"command": "sky", "color": {"r": 1, "g": 2, "b": 3}}"#),
            Some(RemoteCommand::Sky(Rgba::opaque(1, 2, 3)))
        );
        assert_eq!(parse_command(r#"{"command": "jump"}"#), None);
        assert_eq!(parse_command("{not json"), None);
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("effect 3"), None);
    }
}
