//! Command-line argument definitions for the PhyloSVG CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input tree image, the output prefix,
//! the auxiliary tables, and which outputs are written.

use std::str::FromStr;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use phylosvg::config::SupportMode;

/// Command-line arguments for the PhyloSVG tree image tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input tree image
    #[arg(help = "Path to the input SVG file")]
    pub input: String,

    /// Prefix of the output files
    #[arg(short, long, default_value = "out")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Taxonomy color table (`R<TAB>G<TAB>B<TAB>Taxon`)
    #[arg(long)]
    pub colors: Option<String>,

    /// Taxonomy assignment table (`id<TAB>lineage...`)
    #[arg(short, long)]
    pub assign: Option<String>,

    /// Group membership table (`id<TAB>group...`)
    #[arg(short, long, requires = "group_colors")]
    pub groups: Option<String>,

    /// Group color table (`group<TAB>color`)
    #[arg(long, requires = "groups")]
    pub group_colors: Option<String>,

    /// Also write a copy with colored branches and no leaf names
    #[arg(short, long)]
    pub no_names: bool,

    /// Branch stroke width of the no-names copy
    #[arg(short, long)]
    pub stroke: Option<f64>,

    /// Support value handling, overrides the configuration file
    #[arg(short = 'r', long, value_enum)]
    pub support: Option<SupportArg>,

    /// Set recolored Swiss-Prot entry names in bold Arial
    #[arg(short, long, requires = "assign")]
    pub uniprot: bool,

    /// Leave the font of unassigned PDB chain labels unchanged
    #[arg(long)]
    pub no_pdb_bold: bool,

    /// Make labels containing `|MARK|` bold
    #[arg(short, long)]
    pub mark_bold: Option<String>,

    /// Write the leaf ids in vertical order
    #[arg(short, long)]
    pub plain_list: bool,

    /// Keep the pipe format of leaf ids in the plain list
    #[arg(long, requires = "plain_list")]
    pub preserve_pipes: bool,

    /// Write a taxonomy color legend
    #[arg(short, long, requires = "colors")]
    pub legend: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// The `--log-level` filter, `None` when the level is not recognized.
    pub fn log_level_filter(&self) -> Option<LevelFilter> {
        LevelFilter::from_str(&self.log_level).ok()
    }
}

/// Support value handling selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SupportArg {
    /// Keep support labels as they are
    Keep,
    /// Drop support labels
    Remove,
    /// Replace support labels with circles
    Circles,
}

impl From<SupportArg> for SupportMode {
    fn from(arg: SupportArg) -> Self {
        match arg {
            SupportArg::Keep => SupportMode::Keep,
            SupportArg::Remove => SupportMode::Remove,
            SupportArg::Circles => SupportMode::Circles,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "phylosvg",
            "tree.svg",
            "-o",
            "results/tree",
            "--colors",
            "colors.tsv",
            "-a",
            "assign.tsv",
            "-n",
            "-s",
            "2.5",
            "-r",
            "circles",
            "-u",
            "-l",
        ])
        .unwrap();

        assert_eq!(args.input, "tree.svg");
        assert_eq!(args.output, "results/tree");
        assert_eq!(args.assign.as_deref(), Some("assign.tsv"));
        assert!(args.no_names);
        assert_eq!(args.stroke, Some(2.5));
        assert_eq!(args.support, Some(SupportArg::Circles));
        assert!(args.legend);
        assert!(args.uniprot);
        assert!(!args.no_pdb_bold);
        assert!(!args.plain_list);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_log_level_filter() {
        let args = Args::try_parse_from(["phylosvg", "tree.svg", "--log-level", "DEBUG"]).unwrap();
        assert_eq!(args.log_level_filter(), Some(LevelFilter::Debug));

        let args = Args::try_parse_from(["phylosvg", "tree.svg", "--log-level", "loud"]).unwrap();
        assert_eq!(args.log_level_filter(), None);
    }

    #[test]
    fn test_groups_need_group_colors() {
        let err = Args::try_parse_from(["phylosvg", "tree.svg", "-g", "groups.tsv"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
