use async_trait::async_trait;
use log::debug;
use quiz_core::model::{DEFAULT_QUESTION_POINTS, Difficulty, Question, QuestionDraft, QuestionId};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::QuestionSource;
use crate::error::QuestionSourceError;

pub const DEFAULT_TRIVIA_URL: &str = "https://opentdb.com";

/// Multiple-choice questions from an Open Trivia DB compatible API.
#[derive(Clone)]
pub struct TriviaApiSource {
    client: Client,
    base_url: Url,
}

impl TriviaApiSource {
    /// # Errors
    ///
    /// Returns `QuestionSourceError::InvalidUrl` if `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, QuestionSourceError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, amount: u32) -> Result<Url, QuestionSourceError> {
        let mut url = self.base_url.join("api.php")?;
        url.query_pairs_mut()
            .append_pair("amount", &amount.to_string())
            .append_pair("type", "multiple");
        Ok(url)
    }
}

#[async_trait]
impl QuestionSource for TriviaApiSource {
    async fn fetch(&self, count: u32) -> Result<Vec<Question>, QuestionSourceError> {
        let url = self.endpoint(count)?;
        debug!("fetching trivia questions from {url}");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(QuestionSourceError::HttpStatus(response.status()));
        }
        let body: TriviaResponse = response.json().await?;
        body.into_questions()
    }

    fn name(&self) -> &'static str {
        "trivia api"
    }
}

#[derive(Debug, Deserialize)]
struct TriviaResponse {
    response_code: i64,
    #[serde(default)]
    results: Vec<TriviaQuestion>,
}

#[derive(Debug, Deserialize)]
struct TriviaQuestion {
    #[serde(default)]
    category: String,
    #[serde(default)]
    difficulty: Difficulty,
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

impl TriviaResponse {
    /// Number the results from 1 and give each the default points.
    fn into_questions(self) -> Result<Vec<Question>, QuestionSourceError> {
        if self.response_code != 0 {
            return Err(QuestionSourceError::Api(self.response_code));
        }
        if self.results.is_empty() {
            return Err(QuestionSourceError::Empty);
        }
        self.results
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                QuestionDraft {
                    id: QuestionId::new(index as u64 + 1),
                    category: decode_entities(&item.category),
                    difficulty: item.difficulty,
                    prompt: decode_entities(&item.question),
                    correct_answer: decode_entities(&item.correct_answer),
                    incorrect_answers: item
                        .incorrect_answers
                        .iter()
                        .map(|answer| decode_entities(answer))
                        .collect(),
                    points: DEFAULT_QUESTION_POINTS,
                }
                .validate()
                .map_err(|source| QuestionSourceError::InvalidQuestion { index, source })
            })
            .collect()
    }
}

/// Undo the HTML escaping the trivia API applies to every text field.
fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| entity(&tail[1..end]).map(|ch| (ch, end)));
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    let ch = match name {
        "quot" => '"',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "apos" | "rsquo" | "lsquo" => '\'',
        "ldquo" | "rdquo" => '"',
        "hellip" => '…',
        "eacute" => 'é',
        "Eacute" => 'É',
        "aacute" => 'á',
        "iacute" => 'í',
        "oacute" => 'ó',
        "uacute" => 'ú',
        "ntilde" => 'ñ',
        "ouml" => 'ö',
        "uuml" => 'ü',
        "auml" => 'ä',
        "shy" => '\u{ad}',
        _ => return None,
    };
    Some(ch)
}
