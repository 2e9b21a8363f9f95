//! Positional splice plan.
//!
//! Edits are recorded against original token indices and applied in a
//! single left-to-right pass by [`SplicePlan::render`]. Each offset holds an
//! accumulated insertion (text emitted *before* the token at that offset)
//! and at most one replacement (text standing in for a run of tokens
//! starting at that offset).

use std::collections::BTreeMap;

use rebind_lexer::Token;

use crate::StructuralError;

/// How a splice combines with edits already queued at the same offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpliceMode {
    /// Claim `[at, at+len)` exclusively. With length zero, set the insertion
    /// at `at`, which must still be empty.
    Replace,
    /// Insert before anything already inserted at `at`.
    PrependAtStart,
    /// Insert after anything already inserted at `at`.
    AppendAtEnd,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Replacement {
    len: usize,
    text: String,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct SplicePlan {
    insertions: BTreeMap<usize, String>,
    replacements: BTreeMap<usize, Replacement>,
}

impl SplicePlan {
    pub(crate) fn is_empty(&self) -> bool {
        self.insertions.is_empty() && self.replacements.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.insertions.len() + self.replacements.len()
    }

    /// Queue one edit. Bounds are checked by the caller.
    pub(crate) fn queue(
        &mut self,
        text: &str,
        at: usize,
        len: usize,
        mode: SpliceMode,
    ) -> Result<(), StructuralError> {
        match mode {
            SpliceMode::Replace if len > 0 => self.replace(text, at, len),
            SpliceMode::Replace => {
                self.check_insertion_point(at)?;
                if self.insertions.get(&at).is_some_and(|s| !s.is_empty()) {
                    return Err(StructuralError::OverlappingSplice {
                        at,
                        len,
                        existing_at: at,
                    });
                }
                self.insertions.insert(at, text.to_owned());
                Ok(())
            }
            SpliceMode::PrependAtStart | SpliceMode::AppendAtEnd if len > 0 => {
                Err(StructuralError::InsertionWithLength { at, len, mode })
            }
            SpliceMode::PrependAtStart => {
                self.check_insertion_point(at)?;
                self.insertions.entry(at).or_default().insert_str(0, text);
                Ok(())
            }
            SpliceMode::AppendAtEnd => {
                self.check_insertion_point(at)?;
                self.insertions.entry(at).or_default().push_str(text);
                Ok(())
            }
        }
    }

    fn replace(&mut self, text: &str, at: usize, len: usize) -> Result<(), StructuralError> {
        let end = at + len;
        let overlap = |existing_at| StructuralError::OverlappingSplice {
            at,
            len,
            existing_at,
        };

        if let Some((&start, previous)) = self.replacements.range(..=at).next_back() {
            if start + previous.len > at {
                return Err(overlap(start));
            }
        }
        if let Some((&start, _)) = self.replacements.range(at..end).next() {
            return Err(overlap(start));
        }
        if let Some((&offset, _)) = self
            .insertions
            .range(at + 1..end)
            .find(|(_, text)| !text.is_empty())
        {
            return Err(overlap(offset));
        }

        self.replacements.insert(
            at,
            Replacement {
                len,
                text: text.to_owned(),
            },
        );
        Ok(())
    }

    /// An insertion may not land strictly inside a replaced range.
    fn check_insertion_point(&self, at: usize) -> Result<(), StructuralError> {
        match self.replacements.range(..at).next_back() {
            Some((&start, r)) if start + r.len > at => Err(StructuralError::OverlappingSplice {
                at,
                len: 0,
                existing_at: start,
            }),
            _ => Ok(()),
        }
    }

    /// Apply the plan to `tokens` in one pass.
    pub(crate) fn render(&self, tokens: &[Token]) -> String {
        let capacity = tokens.iter().map(|t| t.text.len()).sum::<usize>()
            + self.insertions.values().map(String::len).sum::<usize>();
        let mut out = String::with_capacity(capacity);

        let mut i = 0;
        while i <= tokens.len() {
            if let Some(text) = self.insertions.get(&i) {
                out.push_str(text);
            }
            if let Some(r) = self.replacements.get(&i) {
                out.push_str(&r.text);
                i += r.len;
                continue;
            }
            if let Some(token) = tokens.get(i) {
                out.push_str(&token.text);
            }
            i += 1;
        }
        out
    }
}
