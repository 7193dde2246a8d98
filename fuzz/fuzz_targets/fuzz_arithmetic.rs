#![no_main]

use catena::chars::{decimal, one_of_chars, whitespace};
use catena::{Assoc, Level, OperatorTable, ParseConfig, ParserExt, RepeatExt};
use libfuzzer_sys::fuzz_target;

fn ws<C: 'static>() -> impl catena::Parser<char, C, Output = Vec<char>> {
    whitespace().many()
}

fn arithmetic<C: 'static>() -> impl catena::Parser<char, C, Output = i64> {
    let operand = ws().then(decimal()).before(ws());
    let mul = catena::binary_op(one_of_chars::<C>(['*']), |a: i64, b: i64| a.wrapping_mul(b))
        .or(catena::binary_op(one_of_chars::<C>(['/']), |a: i64, b: i64| {
            if b == 0 { 0 } else { a / b }
        }));
    let add = catena::binary_op(one_of_chars::<C>(['+']), |a: i64, b: i64| a.wrapping_add(b))
        .or(catena::binary_op(one_of_chars::<C>(['-']), |a: i64, b: i64| a.wrapping_sub(b)));
    let neg = catena::unary_op(one_of_chars::<C>(['-']), |a: i64| a.wrapping_neg());

    OperatorTable::new()
        .level(Level::new().infix(Assoc::Left, mul))
        .level(Level::new().prefix(neg).infix(Assoc::Left, add))
        .build(operand)
}

// Feeds arbitrary byte strings through the arithmetic-expression grammar
// built from `OperatorTable`. Not looking for a specific crash signature —
// just that malformed input is always rejected through the ordinary
// `ParseError` path rather than panicking (a non-consuming repetition bug,
// an out-of-bounds slice, an arithmetic overflow panic in release mode with
// overflow checks on).
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let parser = arithmetic::<()>();
        let _ = catena::run(&parser, catena::from_str(s), ParseConfig::default(), ());
    }
});
