//! Benchmarks for the text scanners that run on every scope lookup.
//!
//! Run with: `cargo bench -p the-target`

use divan::{
  Bencher,
  black_box,
};
use the_target::{
  config::TargetConfig,
  items::lex,
  tokenizer::{
    RegexTokenizer,
    Tokenizer,
  },
};

fn main() {
  divan::main();
}

fn repeat_to(line: &str, size: usize) -> String {
  let mut s = String::with_capacity(size + line.len());
  while s.len() < size {
    s.push_str(line);
  }
  s
}

#[divan::bench(args = [64, 1024])]
fn tokenize_code_line(bencher: Bencher, size: usize) {
  let tokenizer = RegexTokenizer::new(&TargetConfig::default()).unwrap();
  let line = repeat_to("const fooBar = items.map((x) => x?.value ?? 0.5); ", size);
  bencher.bench(|| tokenizer.tokens(black_box(&line), "typescript"));
}

#[divan::bench(args = [64, 1024])]
fn tokenize_prose_line(bencher: Bencher, size: usize) {
  let tokenizer = RegexTokenizer::new(&TargetConfig::default()).unwrap();
  let line = repeat_to("Grüße, 世界! Ça va très bien -- merci. ", size);
  bencher.bench(|| tokenizer.tokens(black_box(&line), "plaintext"));
}

#[divan::bench(args = [64, 1024])]
fn lex_collection_items(bencher: Bencher, size: usize) {
  let text = repeat_to("foo(hello, [1, 2]), \"a, b\", { k: v }, ", size);
  bencher.bench(|| lex(black_box(&text)));
}
