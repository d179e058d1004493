//! Source snippets reused across test modules.

#![allow(dead_code)]

/// A value class written out in full except for its accessor.
pub const POINT_WITHOUT_ACCESSOR: &str = r#"class Point {
  private final int x;

  public Point(int x) {
    this.x = x;
  }

  public String toString() {
    return "Point";
  }

  public boolean equals(Object o) {
    return this == o;
  }

  public int hashCode() {
    return this.x;
  }
}
"#;

/// The accessor the generating levels add to [`POINT_WITHOUT_ACCESSOR`].
pub const POINT_ACCESSOR: &str = "
  public int x() {
    return this.x;
  }
";

/// Classes using each other across files, in dependency-hostile order.
pub const SHAPES: &[(&str, &str)] = &[
    (
        "shapes/Square.dj1",
        "package shapes; class Square extends Shape { int side; int area() { return this.side * this.side; } }",
    ),
    (
        "shapes/Shape.dj1",
        "package shapes; abstract class Shape { abstract int area(); }",
    ),
    (
        "app/Main.dj1",
        "package app; import shapes.*; class Main { int total(Square s) { return s.area() + s.side(); } }",
    ),
];
