//! Integration tests for the Diagram render entrypoint.

use chrono::{NaiveDate, NaiveDateTime};

use plotweave::{
    Diagram, Format,
    chart::{BarPlot, Chart, ScatterPlot, ScatterPoint},
    color::Color,
    config::AppConfig,
    containers::{Popup, TimeLine, TimeLineEntry},
    elements::{Button, Legend, Space, Text},
    fonts::HeuristicMeasurer,
    palette::{DiscretePalette, shared},
};

fn day(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 6, d)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .unwrap()
}

fn render(diagram: &mut Diagram, format: Format) -> String {
    diagram
        .render_with_measurer(format, &HeuristicMeasurer::default())
        .unwrap()
}

#[test]
fn test_svg_document_is_complete() {
    let mut diagram = Diagram::new();
    diagram.add(Text::new("Sightings"));
    let plot = ScatterPlot::new(vec![
        ScatterPoint::new(1.0, 2.0).with_category("owl"),
        ScatterPoint::new(3.0, 5.0).with_category("hawk"),
    ]);
    diagram.add(Chart::new(plot, 400.0, 300.0).unwrap());

    let svg = render(&mut diagram, Format::Svg);
    assert!(svg.starts_with("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains("Sightings"));
    assert!(svg.contains("Generated by plotweave"));
    assert_eq!(diagram.len(), 2);
}

#[test]
fn test_render_twice_gives_same_output() {
    let mut diagram = Diagram::new();
    diagram.add(Space::new(10.0, 10.0));
    let first = render(&mut diagram, Format::Svg);
    let second = render(&mut diagram, Format::Svg);
    assert_eq!(first, second);
}

#[test]
fn test_html_page_wires_button_to_popup() {
    let mut diagram = Diagram::new();
    diagram.add(Button::text("More").with_id("more"));
    diagram.add(Popup::new(Text::new("Details"), "About").with_id("about"));
    diagram.connect("more", "click", "about", "click", None);

    let html = render(&mut diagram, Format::Html);
    assert!(html.contains("<svg"));
    assert!(html.contains("<script>"));
    assert!(html.contains("\"destination\":\"about\""));
    assert!(html.contains("\"kind\":\"button\""));
}

#[test]
fn test_timelines_sharing_a_palette_agree_on_colours() {
    let palette = shared(DiscretePalette::new());

    let mut first = TimeLine::new().with_palette(palette.clone());
    first.add(TimeLineEntry::at(day(1)).with_category("rain"));
    first.add(TimeLineEntry::at(day(2)).with_category("sun"));

    let mut second = TimeLine::new().with_palette(palette.clone());
    second.add(TimeLineEntry::at(day(3)).with_category("sun"));
    second.add(TimeLineEntry::at(day(4)).with_category("hail"));
    second.add(
        TimeLineEntry::at(day(5)).with_element(
            Chart::new(
                BarPlot::new([("rain", 3.0), ("sun", 7.0)]).with_palette(palette.clone()),
                200.0,
                150.0,
            )
            .unwrap(),
        ),
    );

    let mut diagram = Diagram::new();
    diagram.add(first);
    diagram.add(second);
    let svg = render(&mut diagram, Format::Svg);

    let palette = palette.borrow();
    let categories: Vec<&str> = palette.categories().map(|(name, _)| name).collect();
    assert_eq!(categories, vec!["rain", "sun", "hail"]);

    let sun = palette.color("sun");
    assert_ne!(sun, palette.color("rain"));
    assert!(svg.matches(&format!("fill=\"{sun}\"")).count() >= 3);
}

#[test]
fn test_config_drives_diagram_defaults() {
    let config = AppConfig::default();
    let ivory = Color::new("ivory").unwrap();
    let mut diagram = Diagram::from_config(config.diagram())
        .unwrap()
        .with_fill(ivory)
        .with_footer(false);
    diagram.add(Space::new(100.0, 100.0));

    let svg = render(&mut diagram, Format::Svg);
    assert!(svg.contains("width=\"200\""));
    assert!(svg.contains(&format!("fill=\"{ivory}\"")));
    assert!(!svg.contains("Generated by plotweave"));
}

#[test]
fn test_legend_after_chart_lists_its_categories() {
    let palette = shared(DiscretePalette::new());
    let mut diagram = Diagram::new().with_footer(false);
    diagram.add(
        Chart::new(
            BarPlot::new([("oak", 4.0), ("ash", 2.0)]).with_palette(palette.clone()),
            300.0,
            200.0,
        )
        .unwrap(),
    );
    diagram.add(Legend::new(palette.clone(), 300.0, 2));

    let svg = render(&mut diagram, Format::Svg);
    let ash = palette.borrow().color("ash");
    assert!(svg.contains(">oak<"));
    assert!(svg.contains(">ash<"));
    assert!(svg.matches(&format!("fill=\"{ash}\"")).count() >= 2);
}
