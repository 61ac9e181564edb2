#![no_main]
use libfuzzer_sys::fuzz_target;
use reparse::testing::{GeneratorConfig, SubjectGenerator};
use reparse::{Grammar, ParseError, Parsing};
use std::sync::{Arc, OnceLock};

const GRAMMAR: &str = r#"
start = _ stmt* !%any.
stmt = "let" _ name _ '=' _ expr ';' _ | expr ';' _.
expr = term (('+' | '-') _ term)*.
term = name | {'0'..'9'+} _ | '(' _ expr ')' _.
name = !"let" {('a'..'z')+} _.
_ = (' ' | '\n')*.
"#;

fn grammar() -> &'static Arc<Grammar> {
    static GRAMMAR_CELL: OnceLock<Arc<Grammar>> = OnceLock::new();
    GRAMMAR_CELL.get_or_init(|| Grammar::compile(GRAMMAR).expect("fuzz grammar compiles"))
}

fn summary(parsing: &mut Parsing) -> Result<(Option<usize>, usize, String), ParseError> {
    let outcome = parsing.parse_start()?;
    Ok((outcome.prefix(), outcome.inspected(), outcome.ops().to_string()))
}

// Input layout: an 8-byte generator seed, then one byte for the edit count.
fuzz_target!(|data: &[u8]| {
    let Some(seed) = data.get(..8).and_then(|bytes| <[u8; 8]>::try_from(bytes).ok()) else {
        return;
    };
    let count = data.get(8).map_or(1, |&n| usize::from(n % 32));

    let generator = SubjectGenerator::new(
        Arc::clone(grammar()),
        GeneratorConfig {
            seed: Some(u64::from_le_bytes(seed)),
            ..GeneratorConfig::default()
        },
    );
    let Some(subject) = generator.generate("start") else {
        return;
    };

    let mut parsing = grammar().parsing(&subject);
    let mut expected = subject.clone();
    let _ = summary(&mut parsing);

    for edit in generator.mutations(&subject, count) {
        edit.apply(&mut parsing).expect("generated edit is in bounds");
        expected = edit.apply_to_str(&expected);
        assert_eq!(parsing.subject(), expected);

        let incremental = summary(&mut parsing);
        let fresh = summary(&mut grammar().parsing(&expected));
        assert_eq!(incremental, fresh, "after {edit:?}, subject {expected:?}");
    }
});
