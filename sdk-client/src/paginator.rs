/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Turns a single operation call into a lazy, forward-only sequence of
//! pages, driven by an output token field that feeds back into the
//! next call's input.

use crate::path;
use sdk_types::Document;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Which fields of the input/output carry the continuation token, and
/// (optionally) a separate "more results available" flag some
/// operations expose instead of (or in addition to) a null token.
#[derive(Clone, Debug)]
pub struct PaginatorState {
    pub input_token_path: Option<&'static str>,
    pub output_token_path: &'static str,
    pub more_results_path: Option<&'static str>,
}

impl PaginatorState {
    pub fn new(output_token_path: &'static str) -> Self {
        PaginatorState { input_token_path: None, output_token_path, more_results_path: None }
    }

    pub fn with_input_token_path(mut self, path: &'static str) -> Self {
        self.input_token_path = Some(path);
        self
    }

    pub fn with_more_results_path(mut self, path: &'static str) -> Self {
        self.more_results_path = Some(path);
        self
    }
}

type PageFuture<'a, E> = Pin<Box<dyn Future<Output = Result<Document, E>> + Send + 'a>>;

/// A forward-only, non-restartable sequence of pages. Each call to
/// [`Paginator::next`] issues one operation call (via the closure
/// supplied at construction) and, unless the sequence has terminated,
/// prepares the input for the following page.
pub struct Paginator<'a, E> {
    state: PaginatorState,
    next_input: Option<Document>,
    call: Box<dyn FnMut(Document) -> PageFuture<'a, E> + Send + 'a>,
}

impl<'a, E> Paginator<'a, E> {
    pub fn new(
        input: Document,
        state: PaginatorState,
        call: impl FnMut(Document) -> PageFuture<'a, E> + Send + 'a,
    ) -> Self {
        Paginator { state, next_input: Some(input), call: Box::new(call) }
    }

    /// Returns the next page, or `None` once the sequence has
    /// terminated. Once this returns `None` (or `Some(Err(_))`),
    /// subsequent calls also return `None`.
    pub async fn next(&mut self) -> Option<Result<Document, E>> {
        let input = self.next_input.take()?;
        let previous_token = self.state.input_token_path.and_then(|p| path::get(&input, p)).cloned();

        let output = match (self.call)(input).await {
            Ok(output) => output,
            Err(err) => return Some(Err(err)),
        };

        let token = path::get(&output, self.state.output_token_path).cloned();
        let more_results = self
            .state
            .more_results_path
            .and_then(|p| path::get(&output, p))
            .and_then(Document::as_bool);

        let terminal = match &token {
            None | Some(Document::Null) => true,
            Some(token) => Some(token) == previous_token.as_ref() || more_results == Some(false),
        };

        if !terminal {
            if let (Some(input_token_path), Some(token)) = (self.state.input_token_path, token) {
                self.next_input = Some(with_token(&output, input_token_path, token));
            }
        }

        Some(Ok(output))
    }
}

/// `input.withToken(token)`: the previous page's output becomes the
/// base for the next input, with the token field overwritten. This
/// assumes input and output share the token's field name, true for
/// every paginated AWS operation.
fn with_token(previous_output: &Document, input_token_path: &str, token: Document) -> Document {
    let mut fields = previous_output.as_object().cloned().unwrap_or_else(HashMap::new);
    fields.insert(input_token_path.to_string(), token);
    Document::Object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn page(token: Option<&str>) -> Document {
        let mut fields = HashMap::new();
        if let Some(token) = token {
            fields.insert("NextToken".to_string(), Document::from(token));
        }
        Document::Object(fields)
    }

    #[tokio::test]
    async fn stops_after_a_null_token() {
        let tokens = ["a", "b"];
        let call_count = Arc::new(AtomicUsize::new(0));
        let state = PaginatorState::new("NextToken").with_input_token_path("NextToken");
        let count = call_count.clone();
        let mut paginator = Paginator::new(
            Document::Object(HashMap::new()),
            state,
            move |_input| {
                let idx = count.fetch_add(1, Ordering::SeqCst);
                let token = tokens.get(idx).copied();
                Box::pin(async move { Ok::<_, ()>(page(token)) })
            },
        );

        let mut pages = Vec::new();
        while let Some(page) = paginator.next().await {
            pages.push(page.unwrap());
        }
        assert_eq!(pages.len(), 3);
        assert!(paginator.next().await.is_none());
    }

    #[tokio::test]
    async fn more_results_false_terminates_even_with_a_token() {
        let state = PaginatorState::new("NextToken").with_more_results_path("HasMore");
        let mut paginator = Paginator::new(Document::Object(HashMap::new()), state, |_input| {
            Box::pin(async move {
                let mut fields = HashMap::new();
                fields.insert("NextToken".to_string(), Document::from("ignored"));
                fields.insert("HasMore".to_string(), Document::Bool(false));
                Ok::<_, ()>(Document::Object(fields))
            })
        });
        assert!(paginator.next().await.is_some());
        assert!(paginator.next().await.is_none());
    }
}
