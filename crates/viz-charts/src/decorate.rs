//! Decorations drawn on top of a chart: title, legend, trap regions,
//! toolkit, data table, plus the tooltip block.
//!
//! Every decoration has a fixed id per chart and goes through
//! [`Surface::replace`], so decorating twice leaves one copy.

use crate::{
    chartkit::{format_percentage, format_value, TextAnchor},
    draw::{HoverTarget, TooltipContent},
    scene::{html_block, Node, Surface},
    segment::LegendEntry,
};
use viz_core::{ChartConfig, TooltipConfig};

/// Opacity of legend entries whose series is hidden
const SEGREGATED_OPACITY: f64 = 0.35;

/// Rough glyph width as a share of the font size, for legend spacing
const GLYPH_RATIO: f64 = 0.6;

const TOOLKIT_BUTTON: f64 = 24.0;

/// Row projection of a chart's data: header = series names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything the decorations read for one pass
#[derive(Debug, Clone, Copy)]
pub struct DecorateContext<'a> {
    pub prefix: &'a str,
    pub config: &'a ChartConfig,
    /// Canvas size of this pass (vertical bars grow with rows)
    pub width: f64,
    pub height: f64,
    pub legend: &'a [LegendEntry],
    pub targets: &'a [HoverTarget],
    /// Present when the table panel is open
    pub table: Option<&'a DataTable>,
}

impl DecorateContext<'_> {
    pub fn id(&self, part: &str) -> String {
        format!("{}-{}", self.prefix, part)
    }
}

/// Add every enabled decoration
pub fn decorate<S: Surface + ?Sized>(surface: &mut S, ctx: &DecorateContext<'_>) {
    let config = ctx.config;

    if config.title().show && !config.title().text.is_empty() {
        surface.replace(title_node(ctx));
    } else {
        surface.remove(&ctx.id("title"));
    }

    if config.legend().show && !ctx.legend.is_empty() {
        surface.replace(legend_node(ctx));
    } else {
        surface.remove(&ctx.id("legend"));
    }

    if config.tooltip().show || config.hover().enabled {
        surface.replace(trap_layer(ctx));
    } else {
        surface.remove(&ctx.id("traps"));
    }

    if config.toolkit().show {
        surface.replace(toolkit_node(ctx));
    } else {
        surface.remove(&ctx.id("toolkit"));
    }

    match ctx.table {
        Some(table) if config.toolkit().show_table => surface.replace(table_node(ctx, table)),
        _ => {
            surface.remove(&ctx.id("table"));
        }
    }

    tracing::trace!("decorated {}", ctx.prefix);
}

// ============================================================================
// TITLE
// ============================================================================

pub fn title_node(ctx: &DecorateContext<'_>) -> Node {
    let title = ctx.config.title();
    let id = ctx.id("title");

    if title.use_div {
        let mut block = Node::new("div")
            .attr("style", format!("text-align:center;color:{};font-size:{}px", title.color, title.font_size))
            .child(Node::new("div").attr("style", "font-weight:bold").text(&title.text));
        if !title.subtitle.is_empty() {
            block = block.child(Node::new("div").attr("style", "opacity:0.7").text(&title.subtitle));
        }
        return html_block(id, 0.0, 0.0, ctx.width, title.font_size * 3.0, block);
    }

    let mut group = Node::new("g").with_id(id).child(
        Node::new("text")
            .attr("x", ctx.width / 2.0)
            .attr("y", title.font_size + 4.0)
            .attr("text-anchor", TextAnchor::Middle.as_str())
            .attr("font-size", title.font_size)
            .attr("font-weight", "bold")
            .attr("fill", &title.color)
            .text(&title.text),
    );
    if !title.subtitle.is_empty() {
        group = group.child(
            Node::new("text")
                .attr("x", ctx.width / 2.0)
                .attr("y", title.font_size * 2.0 + 6.0)
                .attr("text-anchor", TextAnchor::Middle.as_str())
                .attr("font-size", title.font_size * 0.7)
                .attr("fill", &title.color)
                .attr("fill-opacity", 0.7)
                .text(&title.subtitle),
        );
    }
    group
}

// ============================================================================
// LEGEND
// ============================================================================

/// Text of one legend entry per the legend config
pub fn legend_label(entry: &LegendEntry, config: &ChartConfig) -> String {
    let legend = config.legend();
    let tooltip = config.tooltip();
    let mut text = entry.name.clone();
    if legend.show_value {
        text.push_str(&format!(" {}", format_value(entry.value, tooltip.rounding_value)));
    }
    if legend.show_percentage {
        text.push_str(&format!(" ({})", format_percentage(entry.proportion, tooltip.rounding_percentage)));
    }
    text
}

/// Legend item id; the host maps clicks back through `data-dataset-id`
pub fn legend_item_id(prefix: &str, index: usize) -> String {
    format!("{}-legend-{}", prefix, index)
}

pub fn legend_node(ctx: &DecorateContext<'_>) -> Node {
    let legend = ctx.config.legend();
    let id = ctx.id("legend");

    if legend.use_div {
        let items = ctx.legend.iter().map(|entry| {
            Node::new("span")
                .with_id(legend_item_id(ctx.prefix, entry.index))
                .attr("class", "viz-legend-item")
                .attr("data-dataset-id", &entry.dataset_id)
                .attr(
                    "style",
                    format!(
                        "cursor:pointer;margin:0 6px;opacity:{}",
                        if entry.segregated { SEGREGATED_OPACITY } else { 1.0 }
                    ),
                )
                .child(Node::new("span").attr("style", format!("color:{}", entry.color)).text("\u{25cf} "))
                .child(Node::new("span").text(legend_label(entry, ctx.config)))
        });
        let block = Node::new("div")
            .attr(
                "style",
                format!(
                    "display:flex;flex-wrap:wrap;justify-content:center;color:{};font-size:{}px",
                    legend.color, legend.font_size
                ),
            )
            .children(items);
        let height = legend.font_size * 2.5;
        return html_block(id, 0.0, ctx.height - height, ctx.width, height, block);
    }

    let y = ctx.height - legend.font_size;
    let mut x = legend.font_size;
    let items = ctx
        .legend
        .iter()
        .map(|entry| {
            let label = legend_label(entry, ctx.config);
            let item = Node::new("g")
                .with_id(legend_item_id(ctx.prefix, entry.index))
                .attr("class", "viz-legend-item")
                .attr("data-dataset-id", &entry.dataset_id)
                .attr("opacity", if entry.segregated { SEGREGATED_OPACITY } else { 1.0 })
                .attr("style", "cursor:pointer")
                .child(
                    Node::new("circle")
                        .attr("cx", x)
                        .attr("cy", y - legend.font_size / 3.0)
                        .attr("r", legend.font_size / 2.5)
                        .attr("fill", &entry.color),
                )
                .child(
                    Node::new("text")
                        .attr("x", x + legend.font_size)
                        .attr("y", y)
                        .attr("font-size", legend.font_size)
                        .attr("fill", &legend.color)
                        .text(&label),
                );
            x += legend.font_size * 2.0 + label.chars().count() as f64 * legend.font_size * GLYPH_RATIO;
            item
        })
        .collect::<Vec<_>>();

    Node::new("g").with_id(id).children(items)
}

// ============================================================================
// TRAPS
// ============================================================================

/// Trap shape id; `data-target` carries the target position
pub fn trap_id(prefix: &str, target: usize, shape: usize) -> String {
    format!("{}-trap-{}-{}", prefix, target, shape)
}

/// Transparent copies of the target shapes, on top of everything drawn
pub fn trap_layer(ctx: &DecorateContext<'_>) -> Node {
    let traps = ctx.targets.iter().enumerate().flat_map(|(t, target)| {
        target.traps.iter().enumerate().map(move |(k, shape)| {
            let mut shape = shape.clone().with_id(trap_id(ctx.prefix, t, k));
            shape.set_attr("data-target", t);
            shape.set_attr("fill", "transparent");
            shape.set_attr("pointer-events", "all");
            shape
        })
    });
    Node::new("g").with_id(ctx.id("traps")).children(traps)
}

// ============================================================================
// TOOLKIT
// ============================================================================

fn toolkit_button(id: String, action: &str, x: f64, glyph: &str, config: &ChartConfig) -> Node {
    let canvas = config.canvas();
    Node::new("g")
        .with_id(id)
        .attr("data-action", action)
        .attr("style", "cursor:pointer")
        .child(
            Node::new("rect")
                .attr("x", x)
                .attr("y", 4)
                .attr("width", TOOLKIT_BUTTON)
                .attr("height", TOOLKIT_BUTTON)
                .attr("rx", 4)
                .attr("fill", &canvas.background)
                .attr("stroke", &canvas.color)
                .attr("stroke-opacity", 0.3),
        )
        .child(
            Node::new("text")
                .attr("x", x + TOOLKIT_BUTTON / 2.0)
                .attr("y", 4.0 + TOOLKIT_BUTTON * 0.7)
                .attr("text-anchor", TextAnchor::Middle.as_str())
                .attr("font-size", 12)
                .attr("fill", &canvas.color)
                .text(glyph),
        )
}

pub fn toolkit_node(ctx: &DecorateContext<'_>) -> Node {
    let toolkit = ctx.config.toolkit();
    let mut x = ctx.width - TOOLKIT_BUTTON - 4.0;
    let mut group = Node::new("g").with_id(ctx.id("toolkit"));

    if toolkit.show_table {
        group = group.child(toolkit_button(ctx.id("toolkit-table"), "table", x, "\u{2637}", ctx.config));
        x -= TOOLKIT_BUTTON + 4.0;
    }
    if toolkit.show_labels_toggle {
        group = group.child(toolkit_button(ctx.id("toolkit-labels"), "labels", x, "Aa", ctx.config));
    }
    group
}

// ============================================================================
// TABLE
// ============================================================================

pub fn table_node(ctx: &DecorateContext<'_>, table: &DataTable) -> Node {
    let canvas = ctx.config.canvas();
    let cell = |tag: &str, text: &str| {
        Node::new(tag)
            .attr("style", "padding:2px 8px;text-align:right")
            .text(text)
    };

    let header = Node::new("tr").children(table.header.iter().map(|h| cell("th", h)));
    let rows = table
        .rows
        .iter()
        .map(|row| Node::new("tr").children(row.iter().map(|v| cell("td", v))));

    let content = Node::new("div")
        .attr(
            "style",
            format!(
                "max-height:100%;overflow:auto;background:{};color:{};font-size:12px",
                canvas.background, canvas.color
            ),
        )
        .child(
            Node::new("table")
                .attr("style", "border-collapse:collapse;width:100%")
                .child(Node::new("thead").child(header))
                .child(Node::new("tbody").children(rows)),
        );

    let top = TOOLKIT_BUTTON + 8.0;
    html_block(ctx.id("table"), 0.0, top, ctx.width, ctx.height - top, content)
}

// ============================================================================
// TOOLTIP
// ============================================================================

/// HTML content of the shared tooltip
pub fn tooltip_html(content: &TooltipContent, config: &TooltipConfig) -> Node {
    let rows = content.rows.iter().map(|row| {
        let mut text = row.name.clone();
        if config.show_value {
            text.push_str(&format!(": {}", row.value));
        }
        if let (true, Some(percentage)) = (config.show_percentage, &row.percentage) {
            text.push_str(&format!(" ({})", percentage));
        }
        Node::new("div")
            .child(Node::new("span").attr("style", format!("color:{}", row.color)).text("\u{25cf} "))
            .child(Node::new("span").text(text))
    });

    Node::new("div")
        .attr("class", "viz-tooltip")
        .child(Node::new("div").attr("style", "font-weight:bold").text(&content.title))
        .children(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        draw::{draw, DrawOptions, TooltipRow},
        layout,
        scene::SvgSurface,
        segment::{legend_entries, Segregation},
    };
    use serde_json::json;
    use viz_core::{ChartData, ChartKind, DonutConfig, TitleConfig};

    struct Fixture {
        config: ChartConfig,
        legend: Vec<LegendEntry>,
        targets: Vec<HoverTarget>,
    }

    fn fixture(config: ChartConfig) -> Fixture {
        let data = ChartData::normalize_for(
            config.kind(),
            &json!([{ "name": "a", "value": 30 }, { "name": "b", "value": 70 }]),
            config.palette(),
        );
        let seg = Segregation::new();
        let model = layout(&config, &data, &seg, None);
        let drawing = draw(&model, &config, &DrawOptions { prefix: "c", show_labels: true });
        Fixture {
            legend: legend_entries(data.items(), &seg),
            targets: drawing.targets,
            config,
        }
    }

    fn context<'a>(f: &'a Fixture, table: Option<&'a DataTable>) -> DecorateContext<'a> {
        DecorateContext {
            prefix: "c",
            config: &f.config,
            width: 512.0,
            height: 512.0,
            legend: &f.legend,
            targets: &f.targets,
            table,
        }
    }

    fn titled() -> ChartConfig {
        ChartConfig::Donut(DonutConfig {
            title: TitleConfig {
                text: "Sales".into(),
                subtitle: "2024".into(),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[test]
    fn test_decorate_twice_keeps_one_copy() {
        let f = fixture(titled());
        let mut surface = SvgSurface::new(512.0, 512.0);
        decorate(&mut surface, &context(&f, None));
        let first = surface.nodes().len();
        decorate(&mut surface, &context(&f, None));
        assert_eq!(surface.nodes().len(), first);
        assert!(surface.find("c-title").is_some());
        assert!(surface.find("c-legend").is_some());
        assert!(surface.find("c-traps").is_some());
        assert!(surface.find("c-toolkit-table").is_some());
        assert!(surface.find("c-table").is_none());
    }

    #[test]
    fn test_empty_title_is_skipped() {
        let f = fixture(ChartConfig::default_for(ChartKind::Donut));
        let mut surface = SvgSurface::new(512.0, 512.0);
        decorate(&mut surface, &context(&f, None));
        assert!(surface.find("c-title").is_none());
    }

    #[test]
    fn test_title_as_html_block() {
        let mut config = titled();
        if let ChartConfig::Donut(cfg) = &mut config {
            cfg.title.use_div = true;
        }
        let f = fixture(config);
        let node = title_node(&context(&f, None));
        assert_eq!(node.tag, "foreignObject");
        assert!(node.to_svg().contains("Sales"));
    }

    #[test]
    fn test_legend_dims_segregated_entries() {
        let mut f = fixture(ChartConfig::default_for(ChartKind::Donut));
        f.legend[1].segregated = true;
        let legend = legend_node(&context(&f, None));
        assert_eq!(legend.children[0].get_attr("opacity"), Some("1"));
        assert_eq!(legend.children[1].get_attr("opacity"), Some("0.35"));
        assert_eq!(legend.children[1].get_attr("data-dataset-id"), Some(f.legend[1].dataset_id.as_str()));
    }

    #[test]
    fn test_legend_label_format() {
        let f = fixture(ChartConfig::default_for(ChartKind::Donut));
        assert_eq!(legend_label(&f.legend[0], &f.config), "a 30 (30.0%)");
    }

    #[test]
    fn test_traps_cover_every_target() {
        let f = fixture(ChartConfig::default_for(ChartKind::Donut));
        let traps = trap_layer(&context(&f, None));
        assert_eq!(traps.children.len(), 2);
        assert_eq!(traps.children[1].id.as_deref(), Some("c-trap-1-0"));
        assert_eq!(traps.children[1].get_attr("data-target"), Some("1"));
        assert_eq!(traps.children[1].get_attr("fill"), Some("transparent"));
    }

    #[test]
    fn test_open_table_is_drawn() {
        let f = fixture(ChartConfig::default_for(ChartKind::Donut));
        let table = DataTable {
            header: vec!["name".into(), "value".into()],
            rows: vec![vec!["a".into(), "30".into()]],
        };
        let mut surface = SvgSurface::new(512.0, 512.0);
        decorate(&mut surface, &context(&f, Some(&table)));
        let svg = surface.find("c-table").unwrap().to_svg();
        assert!(svg.contains("<th style=\"padding:2px 8px;text-align:right\">name</th>"));

        decorate(&mut surface, &context(&f, None));
        assert!(surface.find("c-table").is_none());
    }

    #[test]
    fn test_tooltip_respects_flags() {
        let content = TooltipContent {
            title: "a".into(),
            rows: vec![TooltipRow {
                color: "#fff".into(),
                name: "a".into(),
                value: "30".into(),
                percentage: Some("30.0%".into()),
            }],
        };
        let full = tooltip_html(&content, &TooltipConfig::default()).to_svg();
        assert!(full.contains("a: 30 (30.0%)"));

        let bare = TooltipConfig { show_value: false, show_percentage: false, ..Default::default() };
        let html = tooltip_html(&content, &bare).to_svg();
        assert!(!html.contains("30"));
    }
}
