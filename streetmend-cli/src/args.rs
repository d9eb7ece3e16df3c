use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use streetmend::{GeometryFormat, GraphExport};

#[derive(Parser, Debug)]
#[command(
    name = "streetmend",
    version,
    about = "Repairs and simplifies street networks read from OSM XML or WKT",
    after_help = "Examples:\n  streetmend mapfile.osm\n  streetmend -o clean.wkt -t 100 -50 mapfile.wkt"
)]
pub struct Cli {
    /// Input map, must end with .osm or .wkt
    pub input: PathBuf,

    /// Output file, defaults to the input path with the format extension appended
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Append to the output file instead of replacing it (WKT only)
    #[arg(short, long)]
    pub append: bool,

    /// Translate the map by X and Y meters
    #[arg(
        short,
        long,
        num_args = 2,
        value_names = ["X", "Y"],
        allow_negative_numbers = true
    )]
    pub translate: Option<Vec<i64>>,

    /// Insert missing landmarks where streets cross. Without this flag the
    /// config file decides, or the question is asked if there is none
    #[arg(long, value_enum)]
    pub repair: Option<RepairMode>,

    /// Also export the weighted graph, may be given several times
    #[arg(long = "graph-format", value_enum)]
    pub graph_formats: Vec<GraphFormatArg>,

    #[arg(long, value_enum, default_value_t = GeometryFormatArg::Wkt)]
    pub geometry_format: GeometryFormatArg,

    /// TOML file with a [pipeline] table
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the pipeline report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// More log output, repeat for more (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RepairMode {
    Yes,
    No,
    /// Ask on the terminal before repairing
    Ask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormatArg {
    Graphml,
    Naeto,
    Dot,
}

impl From<GraphFormatArg> for GraphExport {
    fn from(value: GraphFormatArg) -> Self {
        match value {
            GraphFormatArg::Graphml => GraphExport::GraphMl,
            GraphFormatArg::Naeto => GraphExport::Naeto,
            GraphFormatArg::Dot => GraphExport::Dot,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GeometryFormatArg {
    Wkt,
    Geojson,
}

impl From<GeometryFormatArg> for GeometryFormat {
    fn from(value: GeometryFormatArg) -> Self {
        match value {
            GeometryFormatArg::Wkt => GeometryFormat::Wkt,
            GeometryFormatArg::Geojson => GeometryFormat::GeoJson,
        }
    }
}

impl Cli {
    pub fn translation(&self) -> Option<(i64, i64)> {
        match self.translate.as_deref() {
            Some(&[x, y]) => Some((x, y)),
            _ => None,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        let extension = match self.geometry_format {
            GeometryFormatArg::Wkt => "wkt",
            GeometryFormatArg::Geojson => "geojson",
        };
        with_appended_extension(&self.input, extension)
    }

    /// Default log filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn with_appended_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["streetmend", "map.osm"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("map.osm"));
        assert_eq!(cli.repair, None);
        assert!(!cli.append);
        assert_eq!(cli.translation(), None);
        assert!(cli.graph_formats.is_empty());
        assert_eq!(cli.output_path(), PathBuf::from("map.osm.wkt"));
        assert_eq!(cli.log_filter(), "info");
    }

    #[test]
    fn negative_translation() {
        let cli = Cli::try_parse_from(["streetmend", "-t", "-100", "25", "map.wkt"]).unwrap();
        assert_eq!(cli.translation(), Some((-100, 25)));
    }

    #[test]
    fn translation_needs_two_values() {
        assert!(Cli::try_parse_from(["streetmend", "map.wkt", "-t", "5"]).is_err());
        assert!(Cli::try_parse_from(["streetmend", "-t", "1.5", "2", "map.wkt"]).is_err());
    }

    #[test]
    fn all_options() {
        let cli = Cli::try_parse_from([
            "streetmend",
            "-o",
            "out.json",
            "-a",
            "--repair",
            "no",
            "--graph-format",
            "graphml",
            "--graph-format",
            "naeto",
            "--geometry-format",
            "geojson",
            "--report",
            "report.json",
            "-vv",
            "map.WKT",
        ])
        .unwrap();

        assert!(cli.append);
        assert_eq!(cli.repair, Some(RepairMode::No));
        assert_eq!(
            cli.graph_formats,
            vec![GraphFormatArg::Graphml, GraphFormatArg::Naeto]
        );
        assert_eq!(
            GeometryFormat::from(cli.geometry_format),
            GeometryFormat::GeoJson
        );
        assert_eq!(cli.output_path(), PathBuf::from("out.json"));
        assert_eq!(cli.report, Some(PathBuf::from("report.json")));
        assert_eq!(cli.log_filter(), "trace");
    }

    #[test]
    fn geojson_default_output() {
        let cli =
            Cli::try_parse_from(["streetmend", "--geometry-format", "geojson", "a.wkt"]).unwrap();
        assert_eq!(cli.output_path(), PathBuf::from("a.wkt.geojson"));
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["streetmend"]).is_err());
    }
}
