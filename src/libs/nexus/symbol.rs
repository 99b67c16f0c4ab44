use super::error::MatrixError;
use anyhow::Context;
use indexmap::IndexMap;

/// Codes handed out by [`SymbolTable::allocate`], in allocation order.
pub const SYMBOL_POOL: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Maps arbitrary state identifiers (e.g. reading ids of an apparatus) to
/// single-character codes, monotonically: once given, a code is never
/// reassigned.
///
/// One table belongs to one run. Pass it to every call that must agree on
/// the codes, and persist it with [`SymbolTable::to_json`] if a later run
/// has to continue with the same assignment.
///
/// ```
/// use charmat::libs::nexus::SymbolTable;
///
/// let mut table = SymbolTable::new();
/// assert_eq!(table.allocate("a").unwrap(), b'A');
/// assert_eq!(table.allocate("b").unwrap(), b'B');
/// assert_eq!(table.allocate("a").unwrap(), b'A');
/// assert_eq!(table.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    code_of: IndexMap<String, u8>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code of `ident`, assigning the first unused pool code on
    /// first sight.
    pub fn allocate(&mut self, ident: &str) -> Result<u8, MatrixError> {
        if let Some(&code) = self.code_of.get(ident) {
            return Ok(code);
        }

        let code = SYMBOL_POOL
            .iter()
            .copied()
            .find(|c| !self.code_of.values().any(|v| v == c))
            .ok_or_else(|| MatrixError::AlphabetExhausted {
                ident: ident.to_string(),
                capacity: SYMBOL_POOL.len(),
            })?;
        self.code_of.insert(ident.to_string(), code);

        Ok(code)
    }

    pub fn get(&self, ident: &str) -> Option<u8> {
        self.code_of.get(ident).copied()
    }

    pub fn len(&self) -> usize {
        self.code_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_of.is_empty()
    }

    /// `(ident, code)` pairs in allocation order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> + '_ {
        self.code_of.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Serializes the table as a JSON object `ident => code`.
    pub fn to_json(&self) -> anyhow::Result<String> {
        let map: IndexMap<&str, String> = self
            .iter()
            .map(|(k, v)| (k, (v as char).to_string()))
            .collect();
        Ok(serde_json::to_string_pretty(&map)?)
    }

    /// Restores a table written by [`SymbolTable::to_json`].
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let map: IndexMap<String, String> =
            serde_json::from_str(json).context("Invalid symbol table")?;

        let mut table = Self::new();
        for (ident, code) in map {
            let c = match code.as_bytes() {
                [c] if SYMBOL_POOL.contains(c) => *c,
                _ => anyhow::bail!("Invalid code '{}' for '{}'", code, ident),
            };
            if table.code_of.values().any(|&v| v == c) {
                anyhow::bail!("Code '{}' is assigned twice", code);
            }
            table.code_of.insert(ident, c);
        }

        Ok(table)
    }
}
