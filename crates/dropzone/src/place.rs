//! Implementation for the offline `place` subcommand.

use std::result;

use dropzone_core::{
    Anchor, Display, DropzoneCfg, Placement, Point, Rect, Size, locator::display_for_rect, place,
};
use tracing::debug;

use crate::{
    cli::PlaceArgs,
    error::{Error, Result},
};

/// Parse `n` comma-separated numbers.
fn numbers(raw: &str, n: usize) -> Option<Vec<f64>> {
    let out: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<result::Result<_, _>>()
        .ok()?;
    (out.len() == n).then_some(out)
}

fn parse_point(what: &'static str, raw: &str) -> Result<Point> {
    numbers(raw, 2)
        .map(|v| Point::new(v[0], v[1]))
        .ok_or_else(|| Error::Geometry {
            what,
            raw: raw.to_string(),
            expected: "x,y",
        })
}

fn parse_size(what: &'static str, raw: &str) -> Result<Size> {
    numbers(raw, 2)
        .filter(|v| v[0] > 0.0 && v[1] > 0.0)
        .map(|v| Size::new(v[0], v[1]))
        .ok_or_else(|| Error::Geometry {
            what,
            raw: raw.to_string(),
            expected: "w,h with positive values",
        })
}

fn parse_rect(what: &'static str, raw: &str) -> Result<Rect> {
    numbers(raw, 4)
        .filter(|v| v[2] >= 0.0 && v[3] >= 0.0)
        .map(|v| Rect::new(v[0], v[1], v[2], v[3]))
        .ok_or_else(|| Error::Geometry {
            what,
            raw: raw.to_string(),
            expected: "x,y,w,h",
        })
}

fn parse_display(raw: &str) -> Result<Display> {
    match raw.split_once('/') {
        Some((frame, visible)) => Ok(Display::new(
            parse_rect("display", frame)?,
            parse_rect("display", visible)?,
        )),
        None => Ok(Display::full(parse_rect("display", raw)?)),
    }
}

/// Evaluate placement for the arguments.
fn evaluate(cfg: &DropzoneCfg, args: &PlaceArgs) -> Result<Placement> {
    let cursor = parse_point("cursor", &args.cursor)?;
    let displays = args
        .displays
        .iter()
        .map(String::as_str)
        .map(parse_display)
        .collect::<Result<Vec<_>>>()?;
    let size = match &args.size {
        Some(raw) => parse_size("size", raw)?,
        None => cfg.overlay.size(),
    };
    let anchor = match &args.anchor {
        Some(raw) => {
            let rect = parse_rect("anchor", raw)?;
            display_for_rect(&displays, &rect).map(|display| Anchor { rect, display })
        }
        None => None,
    };
    debug!(?cursor, ?size, ?anchor, n = displays.len(), "place_inputs");
    Ok(place(&cfg.placement, cursor, size, anchor.as_ref(), &displays))
}

/// Run the `place` subcommand and print the chosen frame.
pub fn run(cfg: &DropzoneCfg, args: &PlaceArgs) -> Result<()> {
    let Placement { frame, tier } = evaluate(cfg, args)?;
    println!(
        "{tier:?} x={} y={} w={} h={}",
        frame.x, frame.y, frame.w, frame.h
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use dropzone_core::PlacementTier;

    use super::*;

    fn args(cursor: &str, displays: &[&str], anchor: Option<&str>) -> PlaceArgs {
        PlaceArgs {
            cursor: cursor.to_string(),
            displays: displays.iter().map(|d| d.to_string()).collect(),
            anchor: anchor.map(str::to_string),
            size: None,
        }
    }

    #[test]
    fn test_parse_display_with_visible_area() {
        let d = parse_display("0,0,1600,1000/0,0,1600,975").unwrap();
        assert_eq!(d.frame, Rect::new(0.0, 0.0, 1600.0, 1000.0));
        assert_eq!(d.visible, Rect::new(0.0, 0.0, 1600.0, 975.0));
        assert_eq!(parse_display(" 1, 2 ,3,4").unwrap().visible, Rect::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_parse_rejects_malformed_geometry() {
        assert!(matches!(
            parse_point("cursor", "1,2,3"),
            Err(Error::Geometry { what: "cursor", .. })
        ));
        assert!(parse_rect("anchor", "1,2,x,4").is_err());
        assert!(parse_rect("anchor", "0,0,-5,4").is_err());
        assert!(parse_size("size", "0,10").is_err());
    }

    #[test]
    fn test_evaluate_above_window() {
        let cfg = DropzoneCfg::default();
        let a = args("500,500", &["0,0,1600,1000"], Some("100,100,300,300"));
        let p = evaluate(&cfg, &a).unwrap();
        assert_eq!(p.tier, PlacementTier::AboveWindow);
        assert_eq!(p.frame, Rect::new(110.0, 412.0, 280.0, 240.0));
    }

    #[test]
    fn test_evaluate_size_override_and_no_displays() {
        let cfg = DropzoneCfg::default();
        let mut a = args("500,500", &[], None);
        a.size = Some("100,50".to_string());
        let p = evaluate(&cfg, &a).unwrap();
        assert_eq!(p.tier, PlacementTier::Default);
        assert_eq!(p.frame.size(), Size::new(100.0, 50.0));
    }
}
