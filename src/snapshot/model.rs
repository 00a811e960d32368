use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// The `publish_page` object as embedded in the page, after repair.
#[derive(Debug, Deserialize)]
pub(crate) struct PublishPage {
    #[serde(default)]
    publish_list: Vec<PublishItem>,
}

#[derive(Debug, Deserialize)]
struct PublishItem {
    /// JSON text of a [`PublishInfo`]; some exports inline the object.
    #[serde(default)]
    publish_info: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct PublishInfo {
    #[serde(default)]
    appmsg_info: Vec<AppMsgInfo>,
}

#[derive(Debug, Deserialize)]
struct AppMsgInfo {
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    read_num: Option<Value>,
}

/// Articles and their read counts recovered from a publish history export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishSnapshot {
    pub events: Vec<PublishEvent>,
}

/// One publish action; a single push can carry several articles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishEvent {
    pub articles: Vec<ArticleStats>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleStats {
    pub title: Option<String>,
    pub read_num: Option<u64>,
}

impl PublishSnapshot {
    /// Decode every event's nested `publish_info` document. Events whose
    /// inner document is missing or malformed are logged and skipped.
    pub(crate) fn from_page(page: PublishPage) -> Self {
        let events = page
            .publish_list
            .into_iter()
            .enumerate()
            .filter_map(|(position, item)| match item.publish_info {
                Some(publish_info) => decode_event(position, publish_info),
                None => {
                    debug!(position, "publish event without publish_info");
                    None
                }
            })
            .collect();

        Self { events }
    }

    pub fn articles(&self) -> impl Iterator<Item = &ArticleStats> {
        self.events.iter().flat_map(|event| event.articles.iter())
    }
}

fn decode_event(position: usize, publish_info: Value) -> Option<PublishEvent> {
    let decoded = match publish_info {
        Value::String(text) => serde_json::from_str::<PublishInfo>(&text),
        Value::Object(_) => serde_json::from_value::<PublishInfo>(publish_info),
        other => {
            warn!(position, kind = ?other, "publish_info is neither text nor an object");
            return None;
        }
    };

    match decoded {
        Ok(info) => Some(PublishEvent {
            articles: info.appmsg_info.into_iter().map(ArticleStats::from).collect(),
        }),
        Err(err) => {
            warn!(position, error = %err, "skipping publish event with malformed publish_info");
            None
        }
    }
}

impl From<AppMsgInfo> for ArticleStats {
    fn from(info: AppMsgInfo) -> Self {
        Self {
            title: match info.title {
                Some(Value::String(title)) => Some(title),
                _ => None,
            },
            read_num: info.read_num.as_ref().and_then(read_count),
        }
    }
}

// Counts are integers in current exports; older ones quote them.
fn read_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
