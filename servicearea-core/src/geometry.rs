//! Line measuring and cutting helpers shared by the snapper, the search
//! and the assembler.

use geo::{Coord, CoordsIter, Euclidean, Length, Line, LineString};

/// Euclidean length of a line string
pub fn line_length(line: &LineString<f64>) -> f64 {
    Euclidean.length(line)
}

/// Check that every coordinate of a geometry is finite
pub fn has_finite_coords<G>(geometry: &G) -> bool
where
    G: CoordsIter<Scalar = f64>,
{
    geometry
        .coords_iter()
        .all(|coord| coord.x.is_finite() && coord.y.is_finite())
}

/// Part of `line` between two distances measured from its first coordinate.
///
/// Distances are clamped to the line. The result always has at least two
/// coordinates, so an empty range yields a zero-length line.
pub fn substring(line: &LineString<f64>, start: f64, end: f64) -> LineString<f64> {
    let total = line_length(line);
    let start = start.clamp(0.0, total);
    let end = end.clamp(start, total);

    let mut coords: Vec<Coord<f64>> = Vec::new();
    let mut travelled = 0.0;

    for segment in line.lines() {
        let segment_length = Euclidean.length(&segment);
        let segment_end = travelled + segment_length;

        if coords.is_empty() {
            if segment_end < start {
                travelled = segment_end;
                continue;
            }
            coords.push(point_along(&segment, start - travelled, segment_length));
        }

        if segment_end >= end {
            coords.push(point_along(&segment, end - travelled, segment_length));
            break;
        }

        coords.push(segment.end);
        travelled = segment_end;
    }

    coords.dedup();
    if coords.len() == 1 {
        coords.push(coords[0]);
    }

    LineString::new(coords)
}

/// Split a line at a fraction of its length.
///
/// Both halves share the exact split coordinate.
pub fn split_at_fraction(
    line: &LineString<f64>,
    fraction: f64,
) -> (LineString<f64>, LineString<f64>) {
    let total = line_length(line);
    let at = total * fraction.clamp(0.0, 1.0);

    (substring(line, 0.0, at), substring(line, at, total))
}

fn point_along(segment: &Line<f64>, along: f64, segment_length: f64) -> Coord<f64> {
    if along <= 0.0 || segment_length == 0.0 {
        return segment.start;
    }
    if along >= segment_length {
        return segment.end;
    }

    let ratio = along / segment_length;
    segment.start + (segment.end - segment.start) * ratio
}
