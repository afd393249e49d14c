use anodec_lex::{Lexer, TokenKind};
use anodec_util::{ErrorStream, Name};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sample_source() -> String {
    let mut source = String::new();
    for i in 0..200 {
        source.push_str(&format!(
            "v{}:int = {} + {} * 3; func f{}:int(x:int) x + v{}; f{}({});\n",
            i, i, i, i, i, i, i
        ));
    }
    source
}

fn bench_lexer(c: &mut Criterion) {
    let source = sample_source();
    c.bench_function("lex_mixed_module", |b| {
        b.iter(|| {
            let mut errors = ErrorStream::new();
            let mut lexer = Lexer::new(Name::intern("bench"), black_box(&source), &mut errors);
            let mut count = 0usize;
            loop {
                let token = lexer.next_token();
                if token.kind == TokenKind::EndOfInput {
                    break;
                }
                count += 1;
            }
            black_box(count)
        })
    });
}

criterion_group!(benches, bench_lexer);
criterion_main!(benches);
