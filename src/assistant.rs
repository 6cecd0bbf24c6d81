//! Scripted chat assistant
//!
//! No model and no API key: a keyword table routes the prompt to a topic,
//! the topic's key verse is fetched from a public verse API, and the reply
//! is scripted per language around the fetched text.

use crate::corpus::Language;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const PUBLIC_BIBLE_API: &str = "https://bible-api.com";

struct TopicEntry {
    topic: &'static str,
    keywords: &'static [&'static str],
    reference: &'static str,
}

/// Topic keywords in both languages, each mapped to a key verse.
const TOPICS: &[TopicEntry] = &[
    TopicEntry {
        topic: "peace",
        keywords: &["peace", "calm", "quiet", "rest", "శాంతి", "నెమ్మది"],
        reference: "John 14:27",
    },
    TopicEntry {
        topic: "strength",
        keywords: &["strength", "power", "strong", "bold", "బలం", "శక్తి"],
        reference: "Philippians 4:13",
    },
    TopicEntry {
        topic: "love",
        keywords: &["love", "care", "kind", "heart", "ప్రేమ", "కృప"],
        reference: "1 Corinthians 13:4",
    },
    TopicEntry {
        topic: "faith",
        keywords: &["faith", "believe", "trust", "hope", "విశ్వాసం", "నమ్మకం"],
        reference: "Hebrews 11:1",
    },
    TopicEntry {
        topic: "healing",
        keywords: &["heal", "sick", "doctor", "pain", "స్వస్థత", "వ్యాధి"],
        reference: "Psalm 147:3",
    },
    TopicEntry {
        topic: "anxiety",
        keywords: &["worry", "fear", "anxiety", "scared", "చింత", "భయం"],
        reference: "1 Peter 5:7",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    Success,
    Error,
    /// Reserved for responders that require credentials; the scripted
    /// responder never needs one.
    NeedsKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    pub status: ChatStatus,
}

#[derive(Debug, Deserialize)]
struct VerseApiResponse {
    #[serde(default)]
    text: String,
}

pub struct Assistant {
    client: reqwest::Client,
    base_url: String,
}

impl Assistant {
    pub fn new() -> Self {
        Self::with_base_url(PUBLIC_BIBLE_API)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn respond(&self, prompt: &str, lang: Language) -> ChatReply {
        let Some(entry) = detect_topic(prompt) else {
            return ChatReply { text: general_reply(lang).to_string(), status: ChatStatus::Success };
        };

        match self.fetch_verse(entry.reference).await {
            Ok(verse) => ChatReply {
                text: topical_reply(entry.topic, &verse, entry.reference, lang),
                status: ChatStatus::Success,
            },
            Err(e) => {
                tracing::warn!("Assistant verse fetch failed: {:#}", e);
                ChatReply { text: fallback_reply(lang).to_string(), status: ChatStatus::Error }
            }
        }
    }

    async fn fetch_verse(&self, reference: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, reference);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Request to {} rejected", url))?;
        let body: VerseApiResponse = response
            .json()
            .await
            .with_context(|| format!("Response from {} did not parse", url))?;
        Ok(body.text.trim().to_string())
    }
}

impl Default for Assistant {
    fn default() -> Self {
        Self::new()
    }
}

fn detect_topic(prompt: &str) -> Option<&'static TopicEntry> {
    let query = prompt.to_lowercase();
    TOPICS
        .iter()
        .find(|entry| entry.keywords.iter().any(|k| query.contains(k)))
}

fn topical_reply(topic: &str, verse: &str, reference: &str, lang: Language) -> String {
    match lang {
        Language::Te => format!(
            "ప్రభువు నామములో వందనములు. మీ {} గురించి దేవుని వాక్యం ఇలా చెబుతోంది:\n\n\"{}\"\n({} - KJV)\n\nచింతించకండి, ఆయన కృప మీకు తోడుగా ఉంటుంది. నేను మీ కోసం ప్రార్థిస్తున్నాను.",
            topic, verse, reference
        ),
        Language::En => format!(
            "Praise the Lord! regarding your request for {}, the Word of God provides this divine wisdom:\n\n\"{}\"\n({} - KJV)\n\nDo not be troubled; His grace is sufficient for you. I will keep you in my prayers.",
            topic, verse, reference
        ),
    }
}

fn general_reply(lang: Language) -> &'static str {
    match lang {
        Language::Te => "ప్రభువుకు స్తోత్రం! మీ ప్రశ్న చాలా లోతైనది. దేవుని వాక్యం మనకు ఎల్లప్పుడూ వెలుగును ఇస్తుంది. నేను మీ కోసం మరిన్ని వాక్యాలను అన్వేషిస్తున్నాను.",
        Language::En => "Praise the Lord! Your inquiry is precious. While I am reflecting on the depths of the Word, know that His Spirit guides all who seek Him.",
    }
}

fn fallback_reply(lang: Language) -> &'static str {
    match lang {
        Language::En => "I am reflecting on the Word. Please ensure you are connected to the network to receive real-time web wisdom.",
        Language::Te => "నేను వాక్యాన్ని ధ్యానిస్తున్నాను. రియల్-టైమ్ జ్ఞానాన్ని పొందడానికి నెట్‌వర్క్ కనెక్షన్‌ను తనిఖీ చేయండి.",
    }
}
