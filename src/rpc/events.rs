//! JSON parse events.
//!
//! The RPC mappers consume a flat event stream rather than a `serde_json::Value`
//! tree. [`feed_json`] produces that stream straight from the deserializer:
//! a [`DeserializeSeed`] visitor walks the document and hands each event to an
//! [`EventSink`] as it is read.

use crate::error::{AurError, Result};
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Object,
    Array,
}

/// A JSON leaf value.
///
/// Numbers are carried as text: integers verbatim, floats in their shortest
/// round-trip form (`2.0` becomes `"2"`, `1e3` becomes `"1000"`).
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(String),
    String(String),
}

impl Scalar {
    /// Text form of the value; `None` for null.
    pub fn into_text(self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(b) => Some(b.to_string()),
            Scalar::Number(n) | Scalar::String(n) => Some(n),
        }
    }

    /// True if the value's text is exactly `literal`.
    pub fn is_literal(&self, literal: &str) -> bool {
        match self {
            Scalar::Number(text) | Scalar::String(text) => text == literal,
            Scalar::Null | Scalar::Bool(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonEvent {
    EnterObject,
    EnterArray,
    Close(Container),
    Key(String),
    Scalar(Scalar),
}

/// Consumer of a JSON event stream.
pub trait EventSink {
    /// Handle one event. An error stops the stream.
    fn event(&mut self, event: JsonEvent) -> Result<()>;
}

impl EventSink for Vec<JsonEvent> {
    fn event(&mut self, event: JsonEvent) -> Result<()> {
        self.push(event);
        Ok(())
    }
}

/// Tokenize a JSON document into `sink`.
///
/// An error returned by the sink is passed through unchanged, so a mapper
/// that rejects the response (for example on an error sentinel) surfaces its
/// own error kind rather than a JSON syntax error.
///
/// # Errors
///
/// - [`AurError::EmptyOrMissingInput`] if the input is empty or whitespace
/// - [`AurError::JsonError`] if the input is not a single valid JSON document
/// - whatever the sink returns
pub fn feed_json<S: EventSink + ?Sized>(input: &[u8], sink: &mut S) -> Result<()> {
    if input.iter().all(u8::is_ascii_whitespace) {
        return Err(AurError::EmptyOrMissingInput("JSON response".to_string()));
    }

    let mut failure = None;
    let mut deserializer = serde_json::Deserializer::from_slice(input);
    let seed = EventSeed {
        sink,
        failure: &mut failure,
    };

    let outcome = seed.deserialize(&mut deserializer);
    let outcome = outcome.and_then(|()| deserializer.end());

    match outcome {
        Ok(()) => Ok(()),
        Err(err) => Err(failure.take().unwrap_or(AurError::JsonError(err))),
    }
}

/// Tokenize a JSON document into a vector of events.
pub fn collect_events(input: &[u8]) -> Result<Vec<JsonEvent>> {
    let mut events = Vec::new();
    feed_json(input, &mut events)?;
    Ok(events)
}

struct EventSeed<'s, S: ?Sized> {
    sink: &'s mut S,
    failure: &'s mut Option<AurError>,
}

impl<S: EventSink + ?Sized> EventSeed<'_, S> {
    fn reborrow(&mut self) -> EventSeed<'_, S> {
        EventSeed {
            sink: &mut *self.sink,
            failure: &mut *self.failure,
        }
    }

    /// Forward an event, stashing a sink error so it can be recovered after
    /// serde has wrapped it.
    fn emit<E: de::Error>(&mut self, event: JsonEvent) -> std::result::Result<(), E> {
        self.sink.event(event).map_err(|err| {
            let message = err.to_string();
            *self.failure = Some(err);
            E::custom(message)
        })
    }

    fn scalar<E: de::Error>(mut self, value: Scalar) -> std::result::Result<(), E> {
        self.emit(JsonEvent::Scalar(value))
    }
}

impl<'de, S: EventSink + ?Sized> DeserializeSeed<'de> for EventSeed<'_, S> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de, S: EventSink + ?Sized> Visitor<'de> for EventSeed<'_, S> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<(), E> {
        self.scalar(Scalar::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<(), E> {
        self.scalar(Scalar::Number(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<(), E> {
        self.scalar(Scalar::Number(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<(), E> {
        self.scalar(Scalar::Number(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<(), E> {
        self.scalar(Scalar::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<(), E> {
        self.scalar(Scalar::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<(), E> {
        self.scalar(Scalar::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<(), E> {
        self.scalar(Scalar::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(mut self, mut seq: A) -> std::result::Result<(), A::Error> {
        self.emit::<A::Error>(JsonEvent::EnterArray)?;
        while seq.next_element_seed(self.reborrow())?.is_some() {}
        self.emit(JsonEvent::Close(Container::Array))
    }

    fn visit_map<A: MapAccess<'de>>(mut self, mut map: A) -> std::result::Result<(), A::Error> {
        self.emit::<A::Error>(JsonEvent::EnterObject)?;
        while let Some(key) = map.next_key::<String>()? {
            self.emit::<A::Error>(JsonEvent::Key(key))?;
            map.next_value_seed(self.reborrow())?;
        }
        self.emit(JsonEvent::Close(Container::Object))
    }
}
