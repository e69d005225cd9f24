use crate::token::ClaimToken;

/// Ordered in-memory collection of the claim tokens tied to one persona.
///
/// The store performs no validation; callers verify tokens before
/// appending. It is owned exclusively by one persona and is deliberately
/// not thread-safe; `&mut self` on every mutator makes exclusive use
/// explicit.
#[derive(Clone, Debug, Default)]
pub struct ClaimStore {
    records: Vec<ClaimToken>,
}

impl ClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token to the end of the sequence.
    pub fn append(&mut self, token: ClaimToken) {
        self.records.push(token);
    }

    /// Discard the current sequence and install a new one, returning the
    /// previous sequence.
    pub fn replace_all(&mut self, tokens: Vec<ClaimToken>) -> Vec<ClaimToken> {
        std::mem::replace(&mut self.records, tokens)
    }

    /// All tokens, in insertion order.
    pub fn all(&self) -> &[ClaimToken] {
        &self.records
    }

    /// All tokens whose claim name equals `name`, in original order.
    pub fn claims_for(&self, name: &str) -> Vec<&ClaimToken> {
        self.records
            .iter()
            .filter(|t| t.attribute_name() == name)
            .collect()
    }

    /// Discard every token whose claim name equals `name`. Returns the
    /// number removed.
    pub fn remove_by_name(&mut self, name: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|t| t.attribute_name() != name);
        before - self.records.len()
    }

    /// Remove exactly one token matching `token` by equality. Returns the
    /// removed token, or `None` when no occurrence exists.
    pub fn remove_one(&mut self, token: &ClaimToken) -> Option<ClaimToken> {
        let idx = self.records.iter().position(|t| t == token)?;
        Some(self.records.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
