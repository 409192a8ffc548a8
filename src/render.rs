use crate::chart::{Chart, MARGIN};
use crate::projection::Projection;
use anyhow::{Context, Result};
use geo::{LineString, MultiPolygon};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// SVG path data for one county geometry under the current projection.
pub fn path_data(projection: &Projection, geometry: &MultiPolygon<f64>) -> String {
    let mut d = String::new();
    for polygon in geometry {
        write_ring(&mut d, projection, polygon.exterior());
        for interior in polygon.interiors() {
            write_ring(&mut d, projection, interior);
        }
    }
    d
}

fn write_ring(d: &mut String, projection: &Projection, ring: &LineString<f64>) {
    for (i, coord) in ring.coords().enumerate() {
        let (x, y) = projection.project(coord.x, coord.y);
        let command = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{}{:.2},{:.2}", command, x, y);
    }
    d.push('Z');
}

/// Assemble the full SVG document: surface sized to draw area plus margins,
/// a single margin-offset group, one path per county shape.
pub fn svg_document(chart: &Chart) -> String {
    let (width, height) = chart.surface_size();
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
        width, height
    );
    let _ = writeln!(
        svg,
        r#"  <g class="chart-g" transform="translate({},{})">"#,
        MARGIN, MARGIN
    );
    for shape in chart.shapes() {
        let _ = writeln!(
            svg,
            r##"    <path class="county" id="county-{}" data-fips="{}" d="{}" fill="{}" stroke="#ffffff" stroke-width="0.5"/>"##,
            shape.code, shape.fips, shape.path_data, shape.fill
        );
    }
    svg.push_str("  </g>\n</svg>\n");
    svg
}

pub fn write_svg(path: &Path, chart: &Chart) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
        }
    }
    fs::write(path, svg_document(chart))
        .with_context(|| format!("Failed to write SVG: {:?}", path))?;
    println!("Wrote map to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::RateIndex;
    use crate::types::{CountyFeature, RateRecord};
    use geo::polygon;

    fn sample_chart() -> Chart {
        let geometry = MultiPolygon::new(vec![polygon![
            (x: -93.0, y: 38.0),
            (x: -92.0, y: 38.0),
            (x: -92.0, y: 39.0),
            (x: -93.0, y: 39.0),
            (x: -93.0, y: 38.0),
        ]]);
        let counties = vec![CountyFeature {
            code: "003".to_string(),
            geometry,
        }];
        let rates = RateIndex::build(&[RateRecord {
            fips: "29003".to_string(),
            rate_text: "12.5".to_string(),
        }]);
        Chart::new(counties, rates, 400.0, 300.0)
    }

    #[test]
    fn document_declares_the_full_surface_size() {
        let svg = svg_document(&sample_chart());
        assert!(svg.contains(r#"width="400" height="300""#));
        assert!(svg.contains(r#"transform="translate(10,10)""#));
    }

    #[test]
    fn one_path_per_county() {
        let svg = svg_document(&sample_chart());
        assert_eq!(svg.matches(r#"<path class="county""#).count(), 1);
    }

    #[test]
    fn ring_paths_are_closed() {
        let chart = sample_chart();
        let shape = &chart.shapes()[0];
        assert!(shape.path_data.starts_with('M'));
        assert!(shape.path_data.ends_with('Z'));
    }
}
