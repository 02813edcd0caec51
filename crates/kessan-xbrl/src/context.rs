//! XBRL context index.
//!
//! Every fact in an instance points at a `<xbrli:context>` through its
//! `contextRef` attribute. Only the period part of a context matters here:
//! either a single instant, or a start/end duration.

use crate::error::Result;
use crate::reader::{self, XmlEvent};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Date text as it appears in a context, parsed on demand.
///
/// Malformed dates are kept rather than rejected; they simply never satisfy a
/// period predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodDate(String);

impl PeriodDate {
    /// Wraps raw date text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The raw text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the text as `YYYY-MM-DD`.
    ///
    /// A trailing time or zone suffix (`2023-09-30T00:00:00`, `2023-09-30+09:00`)
    /// is ignored.
    pub fn date(&self) -> Option<NaiveDate> {
        let text = self.0.trim();
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .or_else(|| {
                text.get(..10)
                    .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
            })
    }
}

/// The period a context describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextPeriod {
    /// A point in time (balance sheet items).
    Instant {
        /// The instant
        date: PeriodDate,
    },
    /// A span of time (income statement items).
    Duration {
        /// First day of the span
        start: PeriodDate,
        /// Last day of the span
        end: PeriodDate,
    },
    /// Neither an instant nor a complete duration; unusable for bucketing.
    Unspecified,
}

/// A context declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// The `id` attribute
    pub id: String,
    /// Declared period
    pub period: ContextPeriod,
}

impl Context {
    /// End date of a duration context, if it parses.
    pub fn end_date(&self) -> Option<NaiveDate> {
        match &self.period {
            ContextPeriod::Duration { end, .. } => end.date(),
            ContextPeriod::Instant { .. } | ContextPeriod::Unspecified => None,
        }
    }

    /// Returns true for instant contexts.
    pub const fn is_instant(&self) -> bool {
        matches!(self.period, ContextPeriod::Instant { .. })
    }

    /// Returns true for duration contexts.
    pub const fn is_duration(&self) -> bool {
        matches!(self.period, ContextPeriod::Duration { .. })
    }
}

/// Lookup from context id to context, built once per document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextIndex {
    contexts: HashMap<String, Context>,
}

impl ContextIndex {
    /// Indexes every context declaration in `xml`.
    ///
    /// Contexts without an `id` are ignored; a repeated id replaces the
    /// earlier declaration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ExtractError::MalformedDocument`] if `xml` is not
    /// well-formed.
    pub fn build(xml: &[u8]) -> Result<Self> {
        let mut builder = IndexBuilder::default();
        reader::walk(xml, |event| builder.handle(event))?;
        debug!(contexts = builder.index.len(), "indexed contexts");
        Ok(builder.index)
    }

    /// Looks up a context by id.
    pub fn get(&self, id: &str) -> Option<&Context> {
        self.contexts.get(id)
    }

    /// Number of indexed contexts.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Returns true if no contexts were indexed.
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Adds a context, replacing any previous one with the same id.
    pub fn insert(&mut self, context: Context) {
        self.contexts.insert(context.id.clone(), context);
    }

    /// Iterates over all contexts in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Context> {
        self.contexts.values()
    }
}

impl FromIterator<Context> for ContextIndex {
    fn from_iter<I: IntoIterator<Item = Context>>(iter: I) -> Self {
        let mut index = Self::default();
        for context in iter {
            index.insert(context);
        }
        index
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateField {
    Instant,
    Start,
    End,
}

#[derive(Debug)]
enum Frame {
    Context,
    Date(DateField),
    Other,
}

#[derive(Debug, Default)]
struct PendingContext {
    id: Option<String>,
    instant: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

impl PendingContext {
    fn finish(self) -> Option<Context> {
        let id = self.id?;
        let period = match (self.instant, self.start, self.end) {
            (Some(date), _, _) => ContextPeriod::Instant {
                date: PeriodDate::new(date),
            },
            (None, Some(start), Some(end)) => ContextPeriod::Duration {
                start: PeriodDate::new(start),
                end: PeriodDate::new(end),
            },
            _ => ContextPeriod::Unspecified,
        };
        Some(Context { id, period })
    }
}

#[derive(Debug, Default)]
struct IndexBuilder {
    index: ContextIndex,
    stack: Vec<Frame>,
    pending: Option<PendingContext>,
    text: String,
}

impl IndexBuilder {
    fn handle(&mut self, event: XmlEvent) {
        match event {
            XmlEvent::Start(start) => {
                let frame = if !start.in_instance_namespace() {
                    Frame::Other
                } else if start.local_name == "context" && self.pending.is_none() {
                    self.pending = Some(PendingContext {
                        id: start.attribute("id").map(str::to_string),
                        ..PendingContext::default()
                    });
                    Frame::Context
                } else if self.pending.is_some() {
                    match start.local_name.as_str() {
                        "instant" => Frame::Date(DateField::Instant),
                        "startDate" => Frame::Date(DateField::Start),
                        "endDate" => Frame::Date(DateField::End),
                        _ => Frame::Other,
                    }
                } else {
                    Frame::Other
                };
                if matches!(frame, Frame::Date(_)) {
                    self.text.clear();
                }
                self.stack.push(frame);
            }
            XmlEvent::Text(text) => {
                if matches!(self.stack.last(), Some(Frame::Date(_))) {
                    self.text.push_str(&text);
                }
            }
            XmlEvent::End => match self.stack.pop() {
                Some(Frame::Date(field)) => {
                    if let Some(pending) = self.pending.as_mut() {
                        let value = Some(self.text.trim().to_string());
                        match field {
                            DateField::Instant => pending.instant = value,
                            DateField::Start => pending.start = value,
                            DateField::End => pending.end = value,
                        }
                    }
                }
                Some(Frame::Context) => {
                    if let Some(context) = self.pending.take().and_then(PendingContext::finish) {
                        self.index.insert(context);
                    }
                }
                Some(Frame::Other) | None => {}
            },
        }
    }
}
