//! Turtle-walk interpretation of derived symbol strings.

use glam::Vec2;

/// Failure while interpreting a derived string.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GrammarError {
    /// A branch close with no matching open; the walk cannot continue.
    #[error("branch close at symbol {index} with no open branch")]
    EmptyStack { index: usize },
}

/// One oriented line segment of the walked layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotSegment {
    pub start: Vec2,
    pub end: Vec2,
}

/// The interpreted walk: ordered segments, deduplicated plot points at
/// forward-step endpoints, and the bounding extents a consumer needs to
/// size a placement grid.
#[derive(Clone, Debug, Default)]
pub struct TurtlePath {
    pub segments: Vec<PlotSegment>,
    pub plots: Vec<Vec2>,
    pub min: Vec2,
    pub max: Vec2,
}

/// Walk a derived string with a 2D turtle.
///
/// `A` steps forward one unit recording a plot point, `B` steps twice
/// (recording both endpoints), `>` and `<` turn right/left by 90 degrees,
/// `[` pushes the transform and `]` pops it. Symbols outside the alphabet
/// are skipped. Starts at the origin heading +Y.
pub fn interpret(symbols: &str) -> Result<TurtlePath, GrammarError> {
    let mut position = Vec2::ZERO;
    let mut heading = Vec2::Y;
    let mut stack: Vec<(Vec2, Vec2)> = Vec::new();

    let mut segments = Vec::new();
    let mut plots: Vec<Vec2> = Vec::new();

    let mut forward = |position: &mut Vec2, heading: Vec2| {
        let start = *position;
        *position += heading;
        segments.push(PlotSegment {
            start,
            end: *position,
        });
        if !plots.contains(position) {
            plots.push(*position);
        }
    };

    for (index, symbol) in symbols.chars().enumerate() {
        match symbol {
            'A' => forward(&mut position, heading),
            'B' => {
                forward(&mut position, heading);
                forward(&mut position, heading);
            }
            // 90-degree turns stay on the integer lattice exactly.
            '>' => heading = Vec2::new(heading.y, -heading.x),
            '<' => heading = Vec2::new(-heading.y, heading.x),
            '[' => stack.push((position, heading)),
            ']' => {
                let (saved_position, saved_heading) =
                    stack.pop().ok_or(GrammarError::EmptyStack { index })?;
                position = saved_position;
                heading = saved_heading;
            }
            _ => {}
        }
    }

    let (min, max) = extents(&plots);
    Ok(TurtlePath {
        segments,
        plots,
        min,
        max,
    })
}

fn extents(points: &[Vec2]) -> (Vec2, Vec2) {
    let mut min = Vec2::ZERO;
    let mut max = Vec2::ZERO;
    for p in points {
        min = min.min(*p);
        max = max.max(*p);
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{RuleTable, derive};

    #[test]
    fn test_forward_records_segment_and_plot() {
        let path = interpret("A").unwrap();
        assert_eq!(path.segments.len(), 1);
        assert_eq!(path.plots, vec![Vec2::new(0.0, 1.0)]);
    }

    #[test]
    fn test_b_steps_twice() {
        let path = interpret("B").unwrap();
        assert_eq!(path.segments.len(), 2);
        assert_eq!(path.plots, vec![Vec2::new(0.0, 1.0), Vec2::new(0.0, 2.0)]);
    }

    #[test]
    fn test_turns_are_exact_quarter_rotations() {
        // Right, right, right, right returns to the original heading.
        let path = interpret("A>A>A>A>A").unwrap();
        let first = path.segments[0];
        let last = path.segments[4];
        assert_eq!(last.end - last.start, first.end - first.start);
    }

    #[test]
    fn test_square_walk_closes() {
        let path = interpret("A>A>A>A").unwrap();
        assert_eq!(path.segments.last().unwrap().end, Vec2::ZERO);
    }

    #[test]
    fn test_branch_restores_transform() {
        let path = interpret("A[>A]A").unwrap();
        // After the branch the walk continues straight up from (0, 1).
        assert_eq!(path.segments.last().unwrap().end, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_pop_on_empty_stack_errors() {
        let err = interpret("A]A").unwrap_err();
        assert_eq!(err, GrammarError::EmptyStack { index: 1 });
    }

    #[test]
    fn test_duplicate_plot_points_removed() {
        // Walk up then back down over the same cell.
        let path = interpret("A>>A").unwrap();
        assert_eq!(path.segments.len(), 2);
        assert_eq!(path.plots.len(), 2, "revisited origin recorded once");
    }

    #[test]
    fn test_extents_cover_all_plots() {
        let path = interpret("A>B<A<<B").unwrap();
        for p in &path.plots {
            assert!(p.x >= path.min.x && p.x <= path.max.x);
            assert!(p.y >= path.min.y && p.y <= path.max.y);
        }
    }

    #[test]
    fn test_city_grammar_end_to_end() {
        // The standard city grammar: two derivation rounds, then the walk.
        let mut rules = RuleTable::new();
        rules.add_rule('A', "AB[<BA");
        rules.add_rule('B', "AA>AB]<");
        let derived = derive("A", &rules, 2);

        // Every branch close must have a matching earlier open.
        let mut depth = 0i32;
        for symbol in derived.chars() {
            match symbol {
                '[' => depth += 1,
                ']' => depth -= 1,
                _ => {}
            }
            assert!(depth >= 0, "close without open in {derived}");
        }

        let path = interpret(&derived).unwrap();
        assert!(!path.segments.is_empty());
        assert!(!path.plots.is_empty());

        let again = interpret(&derived).unwrap();
        assert_eq!(path.plots, again.plots, "interpretation must be deterministic");
    }
}
