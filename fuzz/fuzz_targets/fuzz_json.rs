#![no_main]

use catena::chars::{real, whitespace};
use catena::{ParseConfig, Parser, ParserExt, Rec, RepeatExt};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, PartialEq)]
enum Json {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Json>),
    Object(Vec<(String, Json)>),
}

fn ws<C: 'static>() -> impl Parser<char, C, Output = ()> {
    whitespace().many().map(|_| ())
}

fn json_string<C: 'static>() -> impl Parser<char, C, Output = String> {
    catena::token('"')
        .then(catena::none_of::<C>(['"']).many())
        .before(catena::token('"'))
        .map(|chars: Vec<char>| chars.into_iter().collect())
}

fn value<C: 'static>() -> Rec<char, C, Json> {
    catena::rec(|self_| {
        let scalar = catena::keyword_of([
            ("null", Json::Null),
            ("true", Json::Bool(true)),
            ("false", Json::Bool(false)),
        ])
        .or(real().map(Json::Number))
        .or(json_string().map(Json::String));

        let array = catena::token('[')
            .then(ws())
            .then(
                self_
                    .clone()
                    .before(ws())
                    .separated_by(catena::token(',').then(ws())),
            )
            .before(catena::token(']'))
            .map(Json::Array);

        let field = json_string()
            .before(ws())
            .before(catena::token(':'))
            .before(ws())
            .bind(move |key: String| self_.clone().map(move |v: Json| (key.clone(), v)));

        let object = catena::token('{')
            .then(ws())
            .then(field.before(ws()).separated_by(catena::token(',').then(ws())))
            .before(catena::token('}'))
            .map(Json::Object);

        Box::new(scalar.or(array).or(object))
    })
}

// Feeds arbitrary byte strings through a small JSON-subset grammar built
// from `rec` (for the self-referential array/object cases), `separated_by`,
// and plain alternation — no escape-sequence handling in strings, this is
// about exercising the recursive-grammar and separator machinery rather
// than being a complete JSON parser.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let parser = ws().then(value::<()>()).before(ws());
        let _ = catena::run(&parser, catena::from_str(s), ParseConfig::default(), ());
    }
});
