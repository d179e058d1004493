//! Printing parsed units back to source.

#![allow(clippy::unwrap_used)]

use levels::FileId;
use levels::parser::parse_unit;
use levels::syntax::{PrintOptions, print_unit};

fn reprint(source: &str, options: &PrintOptions) -> String {
    let unit = parse_unit(FileId::new(0), source).unwrap();
    print_unit(&unit, options)
}

#[test]
fn test_canonical_source_prints_unchanged() {
    let source = "\
package geo;

import java.util.List;

public class Box {
  private int w;

  public int area(int h) {
    if (h > 0) {
      return this.w * h;
    } else {
      return 0;
    }
  }
}
";
    assert_eq!(reprint(source, &PrintOptions::default()), source);
}

#[test]
fn test_indent_width_is_configurable() {
    let text = reprint("class A { int x; }", &PrintOptions { indent_width: 4 });
    assert_eq!(text, "class A {\n    int x;\n}\n");
}

#[test]
fn test_parentheses_follow_precedence() {
    let text = reprint(
        "class A { int f(int a, int b) { return (a + b) * (a - (b - 1)); } }",
        &PrintOptions::default(),
    );
    assert!(text.contains("return (a + b) * (a - (b - 1));"));
}
