use std::io::Cursor;
use std::sync::Arc;

use entity_trie::{
    tokens, DictionaryBuilder, EntityDictionary, Error, RecognizerBuilder, RecognizerConfig, Token,
    TokenType, ENTITY_IDS,
};

fn words(texts: &[&str]) -> Vec<Token> {
    texts.iter().map(|t| Token::new(*t)).collect()
}

fn run(dict: &Arc<EntityDictionary>, max_tokens: usize, input: &[&str]) -> Vec<Token> {
    RecognizerBuilder::new()
        .dictionary(Arc::clone(dict))
        .max_tokens(max_tokens)
        .build(tokens(words(input)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn lime_wire_scenario() {
    let dict = Arc::new(EntityDictionary::from_pairs([("Lime Wire", "org1")]).unwrap());
    let out = run(&dict, 3, &["Lime", "Wire", "is", ",", "great"]);

    let texts: Vec<&str> = out.iter().map(Token::text).collect();
    assert_eq!(texts, ["Lime Wire", "is", ",", "great"]);

    assert_eq!(out[0].token_type(), &TokenType::Entity);
    assert_eq!(out[0].metadata().get(ENTITY_IDS), ["org1"]);
    assert!(out[1..].iter().all(|t| t.token_type() == &TokenType::Word));
}

#[test]
fn longest_match_takes_precedence() {
    let dict = Arc::new(
        EntityDictionary::from_pairs([("New York City", "id1"), ("New York", "id2")]).unwrap(),
    );
    let out = run(&dict, 3, &["New", "York", "City"]);
    assert_eq!(out, [Token::entity("New York City", ["id1"])]);
}

#[test]
fn unmatched_tokens_keep_order_and_count() {
    let dict = Arc::new(EntityDictionary::from_pairs([("zzz", "none")]).unwrap());
    let input = ["the", "quick", "brown", "fox", "jumps"];
    assert_eq!(run(&dict, 4, &input), words(&input));
}

#[test]
fn single_token_window_ignores_spans() {
    let dict = Arc::new(
        EntityDictionary::from_pairs([("New York", "ny"), ("Boston", "bos")]).unwrap(),
    );
    let out = run(&dict, 1, &["New", "York", "Boston"]);
    assert_eq!(
        out,
        [
            Token::new("New"),
            Token::new("York"),
            Token::entity("Boston", ["bos"]),
        ]
    );
}

#[test]
fn dictionary_loaded_from_lines() {
    let source = "\
# phrase\tidentifier
Lake\tl1
Lax\tl2
Lovely\tl3
Lake\tl4
";
    let mut builder = DictionaryBuilder::new();
    builder.load_lines(Cursor::new(source)).unwrap();
    let dict = builder.build();

    assert_eq!(dict.len(), 3);
    assert_eq!(dict.pair_count(), 4);
    let prefixed: Vec<&str> = dict.prefixed_by("La").map(|(k, _)| k).collect();
    assert_eq!(prefixed, ["Lake", "Lax"]);
    let lake: Vec<&String> = dict.get("Lake").unwrap().iter().collect();
    assert_eq!(lake, ["l1", "l4"]);
}

#[test]
fn configured_recognizer() {
    let config: RecognizerConfig = serde_json::from_str(r#"{ "max_tokens": 2 }"#).unwrap();
    config.validate().unwrap();

    let dict = Arc::new(EntityDictionary::from_pairs([("Lime Wire", "org1")]).unwrap());
    let out: Vec<Token> = RecognizerBuilder::from_config(&config)
        .dictionary(dict)
        .build(tokens(words(&["Lime", "Wire"])))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(out, [Token::entity("Lime Wire", ["org1"])]);
}

#[test]
fn unconfigured_recognizer_fails_fast() {
    let err = RecognizerBuilder::new()
        .build(tokens(words(&["a"])))
        .unwrap_err();
    assert!(matches!(err, Error::MissingDictionary));
    assert_eq!(err.to_string(), "recognizer has no entity dictionary");
}

#[test]
fn shared_dictionary_across_threads() {
    let dict = Arc::new(EntityDictionary::from_pairs([("Lime Wire", "org1")]).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dict = Arc::clone(&dict);
            std::thread::spawn(move || run(&dict, 3, &["Lime", "Wire"]))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), [Token::entity("Lime Wire", ["org1"])]);
    }
}
