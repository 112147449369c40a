//! Forwarding policies.
//!
//! Two strategies are supported, selected by the `filter.policy` config key:
//!
//! - `keyword`: forward iff the text contains the topic keyword.
//! - `source_aware`: exchange accounts must post an official notice marker,
//!   every other account is treated as a news source and must mention the
//!   topic keyword.
//!
//! Matching is case-sensitive substring containment over the raw UTF-8 text.

use serde::{Deserialize, Serialize};

use crate::contract::{FeedFilter, FeedItem};

/// "bitcoin"
pub const DEFAULT_KEYWORD: &str = "比特币";
/// "announcement"
pub const DEFAULT_ANNOUNCEMENT_MARKER: &str = "公告";
pub const DEFAULT_EXCHANGE_HANDLES: [&str; 3] = ["OKCoin", "火币网", "BTCChina"];

fn default_keyword() -> String {
    DEFAULT_KEYWORD.to_string()
}

fn default_exchange_handles() -> Vec<String> {
    DEFAULT_EXCHANGE_HANDLES.iter().map(|h| h.to_string()).collect()
}

fn default_announcement_markers() -> Vec<String> {
    vec![DEFAULT_ANNOUNCEMENT_MARKER.to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FilterPolicy {
    Keyword {
        #[serde(default = "default_keyword")]
        keyword: String,
    },
    SourceAware {
        #[serde(default = "default_keyword")]
        keyword: String,
        #[serde(default = "default_exchange_handles")]
        exchange_handles: Vec<String>,
        #[serde(default = "default_announcement_markers")]
        announcement_markers: Vec<String>,
    },
}

impl Default for FilterPolicy {
    fn default() -> Self {
        FilterPolicy::Keyword {
            keyword: default_keyword(),
        }
    }
}

impl FilterPolicy {
    /// Source-aware policy with the stock exchange list and markers.
    pub fn source_aware() -> Self {
        FilterPolicy::SourceAware {
            keyword: default_keyword(),
            exchange_handles: default_exchange_handles(),
            announcement_markers: default_announcement_markers(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterPolicy::Keyword { .. } => "keyword",
            FilterPolicy::SourceAware { .. } => "source_aware",
        }
    }
}

impl FeedFilter for FilterPolicy {
    fn should_forward(&self, item: &FeedItem) -> bool {
        match self {
            FilterPolicy::Keyword { keyword } => item.text.contains(keyword.as_str()),
            FilterPolicy::SourceAware {
                keyword,
                exchange_handles,
                announcement_markers,
            } => {
                let is_exchange = exchange_handles.iter().any(|h| *h == item.author_handle);
                if is_exchange {
                    announcement_markers
                        .iter()
                        .any(|marker| item.text.contains(marker.as_str()))
                } else {
                    item.text.contains(keyword.as_str())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn item(handle: &str, text: &str) -> FeedItem {
        FeedItem {
            author_name: handle.to_string(),
            author_handle: handle.to_string(),
            id: 1,
            raw_created_at: "Tue May 31 17:46:55 +0800 2011".to_string(),
            created_at: DateTime::parse_from_rfc3339("2011-05-31T17:46:55+08:00").unwrap(),
            text: text.to_string(),
        }
    }

    #[test]
    fn keyword_policy_matches_substring() {
        let policy = FilterPolicy::default();
        assert!(policy.should_forward(&item("news-outlet", "今日比特币价格上涨")));
        assert!(!policy.should_forward(&item("news-outlet", "今日天气晴朗")));
    }

    #[test]
    fn keyword_policy_is_case_sensitive() {
        let policy = FilterPolicy::Keyword {
            keyword: "Bitcoin".into(),
        };
        assert!(policy.should_forward(&item("a", "Bitcoin hits a new high")));
        assert!(!policy.should_forward(&item("a", "bitcoin hits a new high")));
    }

    #[test]
    fn exchange_account_requires_announcement_marker() {
        let policy = FilterPolicy::source_aware();
        assert!(!policy.should_forward(&item("OKCoin", "比特币行情分析")));
        assert!(policy.should_forward(&item("OKCoin", "【公告】系统升级维护通知")));
    }

    #[test]
    fn news_account_requires_topic_keyword() {
        let policy = FilterPolicy::source_aware();
        assert!(policy.should_forward(&item("news-outlet", "比特币交易量创新高")));
        assert!(!policy.should_forward(&item("news-outlet", "【公告】本站改版")));
    }

    #[test]
    fn exchange_handle_match_is_exact() {
        let policy = FilterPolicy::source_aware();
        // Not on the allow-list, so it is judged as a news source.
        assert!(policy.should_forward(&item("okcoin", "比特币")));
        assert!(!policy.should_forward(&item("okcoin", "公告")));
    }

    #[test]
    fn decision_is_idempotent() {
        let policy = FilterPolicy::source_aware();
        let candidates = [
            item("OKCoin", "公告"),
            item("OKCoin", "nothing"),
            item("news-outlet", "比特币"),
            item("news-outlet", "nothing"),
        ];
        for candidate in &candidates {
            assert_eq!(
                policy.should_forward(candidate),
                policy.should_forward(candidate)
            );
        }
    }

    #[test]
    fn deserialises_tagged_policies_with_defaults() {
        let policy: FilterPolicy = serde_json::from_str(r#"{"policy":"source_aware"}"#).unwrap();
        assert_eq!(policy, FilterPolicy::source_aware());

        let policy: FilterPolicy =
            serde_json::from_str(r#"{"policy":"keyword","keyword":"以太坊"}"#).unwrap();
        assert_eq!(
            policy,
            FilterPolicy::Keyword {
                keyword: "以太坊".into()
            }
        );
    }
}
