use crate::provider::{FunctionSignature, ParamMeta};
use crate::util::{null_as_default, string_or_number};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const QUESTION_DATA_QUERY: &str = r#"query questionData($titleSlug: String!) {
  question(titleSlug: $titleSlug) {
    questionId
    questionFrontendId
    title
    titleSlug
    content
    difficulty
    topicTags { name slug }
    codeSnippets { lang langSlug code }
    sampleTestCase
    exampleTestcases
    metaData
  }
}"#;

pub const QUESTION_ID_QUERY: &str = r#"query questionId($titleSlug: String!) {
  question(titleSlug: $titleSlug) {
    questionId
  }
}"#;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'a str>,
    pub variables: BTreeMap<&'a str, &'a str>,
}

impl<'a> GraphqlRequest<'a> {
    pub fn by_slug(query: &'a str, operation_name: Option<&'a str>, slug: &'a str) -> Self {
        let mut variables = BTreeMap::new();
        variables.insert("titleSlug", slug);
        GraphqlRequest {
            query,
            operation_name,
            variables,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct GraphqlResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: GraphqlData,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct GraphqlData {
    #[serde(default)]
    pub question: Option<Question>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Question {
    #[serde(deserialize_with = "null_as_default")]
    pub question_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub question_frontend_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title_slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub difficulty: String,
    #[serde(deserialize_with = "null_as_default")]
    pub topic_tags: Vec<TopicTag>,
    #[serde(deserialize_with = "null_as_default")]
    pub code_snippets: Vec<CodeSnippet>,
    #[serde(deserialize_with = "null_as_default")]
    pub sample_test_case: String,
    #[serde(deserialize_with = "null_as_default")]
    pub example_testcases: String,
    #[serde(deserialize_with = "null_as_default")]
    pub meta_data: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TopicTag {
    pub name: String,
    pub slug: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeSnippet {
    pub lang: String,
    pub lang_slug: String,
    pub code: String,
}

/// Body of `interpret_solution` and `submit`.
#[derive(Serialize, Debug, Clone)]
pub struct RunRequest<'a> {
    pub lang: &'a str,
    pub question_id: &'a str,
    pub typed_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_input: Option<&'a str>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct InterpretResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub interpret_id: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SubmitResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub submission_id: String,
}

/// Shape of the `metaData` JSON string attached to each question.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RawMeta {
    pub name: String,
    pub params: Vec<RawParam>,
    #[serde(rename = "return")]
    pub ret: Option<RawParam>,
    #[serde(rename = "systemdesign")]
    pub system_design: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RawParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl From<RawParam> for ParamMeta {
    fn from(p: RawParam) -> Self {
        ParamMeta {
            name: p.name,
            ty: p.ty,
        }
    }
}

/// Parse `metaData`. Empty, unparseable or nameless metadata gives `None`.
pub fn parse_meta_data(raw: &str) -> Option<FunctionSignature> {
    if raw.trim().is_empty() {
        return None;
    }
    let meta: RawMeta = match serde_json::from_str(raw) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!("Ignoring unparseable metaData: {}", e);
            return None;
        }
    };
    if meta.name.is_empty() {
        return None;
    }
    Some(FunctionSignature {
        name: meta.name,
        params: meta.params.into_iter().map(Into::into).collect(),
        ret: meta.ret.filter(|r| !r.ty.is_empty()).map(Into::into),
        system_design: meta.system_design,
    })
}
