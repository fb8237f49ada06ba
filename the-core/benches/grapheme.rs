//! Benchmarks for grapheme splitting of token text.
//!
//! Run with: `cargo bench -p the-core`

use divan::{
  Bencher,
  black_box,
};
use the_core::{
  chars::categorize_grapheme,
  grapheme::{
    grapheme_char_ranges,
    graphemes,
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
  while s.len() > size {
    s.pop();
  }
  s
}

#[divan::bench(args = [64, 1024])]
fn split_ascii_token(bencher: Bencher, size: usize) {
  let text = repeat_to("someIdentifierName_", size);
  bencher.bench(|| grapheme_char_ranges(black_box(&text)));
}

#[divan::bench(args = [64, 1024])]
fn split_mixed_token(bencher: Bencher, size: usize) {
  let text = repeat_to("Hello世界🎉a\u{0301}テスト", size);
  bencher.bench(|| grapheme_char_ranges(black_box(&text)));
}

#[divan::bench(args = [64, 1024])]
fn categorize_mixed_token(bencher: Bencher, size: usize) {
  let text = repeat_to("let x = \"a\u{0301}😀\";\n", size);
  bencher.bench(|| {
    graphemes(black_box(&text))
      .map(|(_, grapheme)| categorize_grapheme(grapheme).preference())
      .max()
  });
}
