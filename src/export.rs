//! Exports of the weighted street graph for network analysis tools.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use log::info;
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use streetmend_core::prelude::*;

const GRAPHML_NS: &str = "http://graphml.graphdrawing.org/xmlns";
const GRAPHML_SCHEMA: &str = "http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Graph file format, every export only sees the weighted view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphExport {
    /// GraphML with the edge weight as `double` data key `d1`
    GraphMl,
    /// DOT with the edge weight as `len` attribute
    Naeto,
    /// Plain undirected DOT
    Dot,
}

impl FromStr for GraphExport {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "graphml" => Ok(Self::GraphMl),
            "naeto" => Ok(Self::Naeto),
            "dot" => Ok(Self::Dot),
            other => Err(Error::InvalidData(format!(
                "Unknown graph format '{other}', expected graphml, naeto or dot"
            ))),
        }
    }
}

impl GraphExport {
    pub const ALL: [GraphExport; 3] = [Self::GraphMl, Self::Naeto, Self::Dot];

    pub fn file_suffix(self) -> &'static str {
        match self {
            Self::GraphMl => "SNA_GraphML.dat",
            Self::Naeto => "SNA_NAETO.dat",
            Self::Dot => "SNA_DOT.dat",
        }
    }

    /// `<dest>.<suffix>`, keeping whatever extension `dest` already has
    pub fn path_for(self, dest: &Path) -> PathBuf {
        let mut name = dest.as_os_str().to_owned();
        name.push(".");
        name.push(self.file_suffix());
        PathBuf::from(name)
    }

    pub fn write<W: Write>(self, graph: &WeightedGraph, writer: W) -> Result<(), Error> {
        match self {
            Self::GraphMl => write_graphml(graph, writer),
            Self::Naeto => write_dot(graph, writer, true),
            Self::Dot => write_dot(graph, writer, false),
        }
    }

    /// Writes the graph next to `dest` and returns the file written
    pub fn export_to(self, graph: &WeightedGraph, dest: &Path) -> Result<PathBuf, Error> {
        let path = self.path_for(dest);
        let mut writer = BufWriter::new(File::create(&path)?);
        self.write(graph, &mut writer)?;
        writer.flush()?;
        info!("Graph exported as {self:?} to {}", path.display());
        Ok(path)
    }
}

fn write_dot<W: Write>(
    graph: &WeightedGraph,
    mut writer: W,
    with_length: bool,
) -> Result<(), Error> {
    writeln!(writer, "graph G {{")?;
    for vertex in graph.vertices() {
        writeln!(writer, "  {vertex};")?;
    }
    for edge in graph.edges() {
        if with_length {
            writeln!(
                writer,
                "  {} -- {}  [len={}];",
                edge.source, edge.target, edge.weight
            )?;
        } else {
            writeln!(writer, "  {} -- {};", edge.source, edge.target)?;
        }
    }
    writeln!(writer, "}}")?;
    Ok(())
}

fn xml_error(err: impl std::fmt::Display) -> Error {
    Error::XmlError(err.to_string())
}

fn write_graphml<W: Write>(graph: &WeightedGraph, writer: W) -> Result<(), Error> {
    let mut xml = Writer::new_with_indent(writer, b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    xml.write_event(Event::Start(BytesStart::new("graphml").with_attributes([
        ("xmlns", GRAPHML_NS),
        ("xmlns:xsi", XSI_NS),
        ("xsi:schemaLocation", GRAPHML_SCHEMA),
    ])))
    .map_err(xml_error)?;

    xml.write_event(Event::Empty(BytesStart::new("key").with_attributes([
        ("id", "d1"),
        ("for", "edge"),
        ("attr.name", "weight"),
        ("attr.type", "double"),
    ])))
    .map_err(xml_error)?;

    xml.write_event(Event::Start(
        BytesStart::new("graph").with_attributes([("edgedefault", "undirected")]),
    ))
    .map_err(xml_error)?;

    for vertex in graph.vertices() {
        let id = vertex.to_string();
        xml.write_event(Event::Empty(
            BytesStart::new("node").with_attributes([("id", id.as_str())]),
        ))
        .map_err(xml_error)?;
    }

    for (index, edge) in graph.edges().enumerate() {
        let id = (index + 1).to_string();
        let source = edge.source.to_string();
        let target = edge.target.to_string();
        let weight = edge.weight.to_string();

        xml.write_event(Event::Start(BytesStart::new("edge").with_attributes([
            ("id", id.as_str()),
            ("source", source.as_str()),
            ("target", target.as_str()),
        ])))
        .map_err(xml_error)?;
        xml.write_event(Event::Start(
            BytesStart::new("data").with_attributes([("key", "d1")]),
        ))
        .map_err(xml_error)?;
        xml.write_event(Event::Text(BytesText::new(&weight)))
            .map_err(xml_error)?;
        xml.write_event(Event::End(BytesEnd::new("data")))
            .map_err(xml_error)?;
        xml.write_event(Event::End(BytesEnd::new("edge")))
            .map_err(xml_error)?;
    }

    xml.write_event(Event::End(BytesEnd::new("graph")))
        .map_err(xml_error)?;
    xml.write_event(Event::End(BytesEnd::new("graphml")))
        .map_err(xml_error)?;

    let mut writer = xml.into_inner();
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> WeightedGraph {
        let mut network = StreetNetwork::default();
        network.add_polyline([(0.0, 0.0), (3.0, 4.0), (3.0, 6.5)]);
        WeightedGraph::build(&network, DEFAULT_PRECISION).unwrap()
    }

    fn render(format: GraphExport) -> String {
        let mut out = Vec::new();
        format.write(&graph(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn naeto_carries_lengths() {
        assert_eq!(
            render(GraphExport::Naeto),
            "graph G {\n  1;\n  2;\n  3;\n  1 -- 2  [len=5];\n  2 -- 3  [len=2.5];\n}\n"
        );
    }

    #[test]
    fn dot_has_no_weights() {
        let dot = render(GraphExport::Dot);
        assert!(dot.starts_with("graph G {\n"));
        assert!(dot.contains("  2 -- 3;\n"));
        assert!(!dot.contains("len="));
    }

    #[test]
    fn graphml_declares_weight_key() {
        let graphml = render(GraphExport::GraphMl);
        assert!(graphml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(graphml.contains(
            r#"<key id="d1" for="edge" attr.name="weight" attr.type="double"/>"#
        ));
        assert!(graphml.contains(r#"<graph edgedefault="undirected">"#));
        assert!(graphml.contains(r#"<node id="3"/>"#));
        assert!(graphml.contains(r#"<edge id="2" source="2" target="3">"#));
        assert!(graphml.contains(r#"<data key="d1">2.5</data>"#));
    }

    #[test]
    fn file_names_keep_destination() {
        let path = GraphExport::GraphMl.path_for(Path::new("out/city.wkt"));
        assert_eq!(path, PathBuf::from("out/city.wkt.SNA_GraphML.dat"));
        assert_eq!(GraphExport::Dot.file_suffix(), "SNA_DOT.dat");
        assert_eq!("NAETO".parse::<GraphExport>().unwrap(), GraphExport::Naeto);
        assert!("gml".parse::<GraphExport>().is_err());
    }
}
