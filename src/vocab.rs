// Token vocabulary: the bijection between symbols and model ids.
//
// Built once from a full corpus, immutable afterwards. Ids are assigned in
// first-occurrence order, which makes the mapping deterministic for a given
// corpus — rebuilding from the same single-file dataset always yields the
// same ids, so a persisted mapping and a rebuilt one agree.
//
// Persisted as JSON in the same shape as the corpus tools expect:
// {"60": 0, "r": 1, "_": 2, "/": 3, ...}.

use crate::error::{Error, Result};
use crate::token::Token;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Immutable symbol <-> id table. `symbol_of` is O(1) through the inverse
/// table; both directions agree by construction.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    ids: HashMap<Token, usize>,
    symbols: Vec<Token>,
}

impl Vocabulary {
    /// Build from a corpus token stream, assigning ids in first-occurrence
    /// order. The rest, continuation, and terminator tokens are appended if
    /// the corpus happens not to contain them, since generation needs all
    /// three. Fails with `EmptyCorpus` on empty input.
    pub fn build(corpus: &[Token]) -> Result<Vocabulary> {
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let mut vocab = Vocabulary {
            ids: HashMap::new(),
            symbols: Vec::new(),
        };
        let required = [Token::Rest, Token::Continuation, Token::Terminator];
        for &token in corpus.iter().chain(required.iter()) {
            if !vocab.ids.contains_key(&token) {
                vocab.ids.insert(token, vocab.symbols.len());
                vocab.symbols.push(token);
            }
        }
        Ok(vocab)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Look up a token's id.
    pub fn id_of(&self, token: Token) -> Result<usize> {
        self.ids
            .get(&token)
            .copied()
            .ok_or(Error::UnknownSymbol(token))
    }

    /// Look up the token for an id. Exact inverse of `id_of`.
    pub fn symbol_of(&self, id: usize) -> Result<Token> {
        self.symbols.get(id).copied().ok_or(Error::UnknownId(id))
    }

    /// Id of the terminator token. Always present (see `build`).
    pub fn terminator_id(&self) -> usize {
        self.ids[&Token::Terminator]
    }

    /// Write the mapping to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let map: BTreeMap<String, usize> = self
            .symbols
            .iter()
            .enumerate()
            .map(|(id, token)| (token.to_string(), id))
            .collect();
        std::fs::write(path, serde_json::to_string_pretty(&map)?)?;
        Ok(())
    }

    /// Reload a mapping saved by `save`. The loaded table is bit-for-bit the
    /// same bijection: ids must form a contiguous range starting at 0.
    pub fn load(path: &Path) -> Result<Vocabulary> {
        let data = std::fs::read_to_string(path)?;
        let map: BTreeMap<String, usize> = serde_json::from_str(&data)?;
        if map.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let mut slots: Vec<Option<Token>> = vec![None; map.len()];
        for (text, id) in &map {
            let token = Token::parse(text)?;
            // Out-of-range or duplicate id: not a bijection.
            if *id >= slots.len() || slots[*id].is_some() {
                return Err(Error::UnknownId(*id));
            }
            slots[*id] = Some(token);
        }
        let symbols: Vec<Token> = slots.into_iter().flatten().collect();
        let ids: HashMap<Token, usize> = symbols
            .iter()
            .enumerate()
            .map(|(id, &token)| (token, id))
            .collect();
        // Generation needs the terminator; a mapping without one is not a
        // mapping this pipeline wrote.
        if !ids.contains_key(&Token::Terminator) {
            return Err(Error::UnknownSymbol(Token::Terminator));
        }
        Ok(Vocabulary { ids, symbols })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_corpus() -> Vec<Token> {
        // "60 _ 62 r / 60"
        vec![
            Token::Pitch(60),
            Token::Continuation,
            Token::Pitch(62),
            Token::Rest,
            Token::Terminator,
            Token::Pitch(60),
        ]
    }

    #[test]
    fn test_first_occurrence_order() {
        let vocab = Vocabulary::build(&small_corpus()).unwrap();
        assert_eq!(vocab.id_of(Token::Pitch(60)).unwrap(), 0);
        assert_eq!(vocab.id_of(Token::Continuation).unwrap(), 1);
        assert_eq!(vocab.id_of(Token::Pitch(62)).unwrap(), 2);
        assert_eq!(vocab.id_of(Token::Rest).unwrap(), 3);
        assert_eq!(vocab.id_of(Token::Terminator).unwrap(), 4);
        assert_eq!(vocab.len(), 5);
    }

    #[test]
    fn test_bijection() {
        let vocab = Vocabulary::build(&small_corpus()).unwrap();
        for id in 0..vocab.len() {
            let token = vocab.symbol_of(id).unwrap();
            assert_eq!(vocab.id_of(token).unwrap(), id);
        }
    }

    #[test]
    fn test_required_tokens_appended() {
        // Corpus with pitches only: rest/continuation/terminator still mapped.
        let vocab = Vocabulary::build(&[Token::Pitch(60)]).unwrap();
        assert_eq!(vocab.len(), 4);
        assert!(vocab.id_of(Token::Rest).is_ok());
        assert!(vocab.id_of(Token::Continuation).is_ok());
        assert_eq!(vocab.terminator_id(), 3);
    }

    #[test]
    fn test_empty_corpus_rejected() {
        assert!(matches!(Vocabulary::build(&[]), Err(Error::EmptyCorpus)));
    }

    #[test]
    fn test_unknown_lookups() {
        let vocab = Vocabulary::build(&small_corpus()).unwrap();
        assert!(matches!(
            vocab.id_of(Token::Pitch(99)),
            Err(Error::UnknownSymbol(_))
        ));
        assert!(matches!(vocab.symbol_of(100), Err(Error::UnknownId(100))));
    }

    #[test]
    fn test_save_load_same_bijection() {
        let dir = std::env::temp_dir().join("folkweave_vocab_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("mapping.json");

        let vocab = Vocabulary::build(&small_corpus()).unwrap();
        vocab.save(&path).unwrap();
        let reloaded = Vocabulary::load(&path).unwrap();

        assert_eq!(reloaded.len(), vocab.len());
        for id in 0..vocab.len() {
            assert_eq!(reloaded.symbol_of(id).unwrap(), vocab.symbol_of(id).unwrap());
        }
    }
}
