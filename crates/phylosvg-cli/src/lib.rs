//! CLI logic for the PhyloSVG tree image tool.
//!
//! The pipeline reads a rendered tree image and writes, next to the output
//! prefix:
//!
//! - `PREFIX_colored.svg`: labels recolored by taxonomy, group markers and
//!   support labels handled as configured
//! - `PREFIX_noname.svg`: branches colored after their leaves, leaf names
//!   omitted (`--no-names`)
//! - `PREFIX.tax_legend.svg`: the taxonomy color legend (`--legend`)
//! - `PREFIX.plain.ids`: leaf ids from top to bottom (`--plain-list`)

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, SupportArg};

use std::fs;

use log::{info, warn};

use phylosvg::{
    GroupAssignment, GroupColors, PhyloSvgError, RecolorOptions, TaxonomyAssignment,
    TaxonomyColors, TreeImageBuilder, mark_bold, recolor_labels, render_legend,
};
use phylosvg_parser::error::Diagnostic;

use error_adapter::diagnostic_reportables;

/// Run the PhyloSVG CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `PhyloSvgError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Invalid auxiliary tables
/// - Group markers without a group color
pub fn run(args: &Args) -> Result<(), PhyloSvgError> {
    info!(
        input_path = args.input,
        output_prefix = args.output;
        "Processing tree image"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(support) = args.support {
        app_config.support_mut().set_mode(support.into());
    }
    if let Some(stroke) = args.stroke {
        app_config.style_mut().set_branch_stroke_width(Some(stroke));
    }

    let source = fs::read_to_string(&args.input)?;

    let builder = TreeImageBuilder::new(app_config);
    let (mut document, warnings) = builder.parse(&source)?.into_parts();
    report_warnings(&warnings, &source);

    let taxonomy_colors = args
        .colors
        .as_deref()
        .map(|path| TaxonomyColors::parse(&fs::read_to_string(path)?))
        .transpose()?;

    match (&taxonomy_colors, &args.assign) {
        (Some(colors), Some(path)) => {
            let assignment = TaxonomyAssignment::parse(&fs::read_to_string(path)?);
            let options = RecolorOptions::new()
                .with_uniprot_fonts(args.uniprot)
                .with_pdb_fonts(!args.no_pdb_bold);
            recolor_labels(&mut document, colors, &assignment, options);
        }
        (None, Some(_)) => {
            warn!("Taxonomy assignment given without a color table, labels keep their colors");
        }
        _ => {}
    }

    if let Some(mark) = &args.mark_bold {
        mark_bold(&mut document, mark);
    }

    let groups = match (&args.groups, &args.group_colors) {
        (Some(groups), Some(colors)) => Some((
            GroupAssignment::parse(&fs::read_to_string(groups)?)?,
            GroupColors::parse(&fs::read_to_string(colors)?)?,
        )),
        _ => None,
    };
    let groups = groups.as_ref().map(|(assignment, colors)| (assignment, colors));

    let colored = builder.render(&document, false, groups)?;
    write_output(&args.output, "_colored.svg", &colored)?;

    if args.no_names {
        builder.color_branches(&mut document);
        let noname = builder.render(&document, true, groups)?;
        write_output(&args.output, "_noname.svg", &noname)?;
    }

    if args.legend {
        match &taxonomy_colors {
            Some(colors) => write_output(&args.output, ".tax_legend.svg", &render_legend(colors))?,
            None => warn!("No taxonomy color table, skipping legend"),
        }
    }

    if args.plain_list {
        let ids = builder.leaf_order(&document, args.preserve_pipes);
        let mut list = ids.join("\n");
        if !list.is_empty() {
            list.push('\n');
        }
        write_output(&args.output, ".plain.ids", &list)?;
    }

    Ok(())
}

/// Process exit status for a failed [`run`]: 2 when the input is not a
/// readable tree image, 1 otherwise.
pub fn exit_status(err: &PhyloSvgError) -> i32 {
    match err {
        PhyloSvgError::Parse { .. } => 2,
        _ => 1,
    }
}

/// Output path for `prefix` with `suffix` appended to its file name.
pub fn output_path(prefix: &str, suffix: &str) -> String {
    format!("{prefix}{suffix}")
}

fn write_output(prefix: &str, suffix: &str, content: &str) -> Result<(), PhyloSvgError> {
    let path = output_path(prefix, suffix);
    fs::write(&path, content)?;
    info!(output_file = path; "Output written");
    Ok(())
}

/// Log the recoverable parser diagnostics with their source snippets.
fn report_warnings(warnings: &[Diagnostic], source: &str) {
    if warnings.is_empty() {
        return;
    }
    let reporter = miette::GraphicalReportHandler::new();
    for reportable in diagnostic_reportables(warnings, source) {
        let mut writer = String::new();
        match reporter.render_report(&mut writer, &reportable) {
            Ok(()) => warn!("{writer}"),
            Err(_) => warn!("{reportable}"),
        }
    }
}
