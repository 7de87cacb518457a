//! Overpass JSON to [`Feature`]s.
//!
//! Tagged nodes become points. Ways become line strings, or polygons
//! when closed and area-like. `multipolygon` and `boundary` relations
//! have their member ways stitched into rings. Untagged ways that only
//! serve as multipolygon members are not emitted on their own.

use crate::{Feature, QueryError, Tags};
use geo::{
    geometry::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon},
    Contains,
};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    elements: Vec<Element>,

    /// Set by the server on timeouts and other runtime errors.
    remark: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
        #[serde(default)]
        tags: Tags,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: Tags,
    },
    Relation {
        id: i64,
        #[serde(default)]
        members: Vec<Member>,
        #[serde(default)]
        tags: Tags,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct Member {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "ref")]
    id: i64,
    #[serde(default)]
    role: String,
}

/// Decodes an Overpass `[out:json]` response.
///
/// A response with a `remark` is an error, since its elements may be
/// incomplete.
pub fn decode(bytes: &[u8]) -> Result<Vec<Feature>, QueryError> {
    let response: Response = serde_json::from_slice(bytes)?;
    if let Some(remark) = response.remark {
        warn!("overpass remark: {remark}");
        return Err(QueryError::Remark(remark));
    }
    Ok(Topology::new(response.elements).features())
}

struct Way {
    id: i64,
    nodes: Vec<i64>,
    tags: Tags,
}

struct Relation {
    id: i64,
    members: Vec<Member>,
    tags: Tags,
}

/// Elements indexed by id, in first-seen order.
///
/// The same element can show up twice (once with tags from
/// `out body`, once bare from `out skel`), so repeats only fill in
/// what's missing.
#[derive(Default)]
struct Topology {
    coords: HashMap<i64, Coord>,
    tagged_nodes: Vec<(i64, Tags)>,
    ways: Vec<Way>,
    way_index: HashMap<i64, usize>,
    relations: Vec<Relation>,
    relation_index: HashMap<i64, usize>,
}

impl Topology {
    fn new(elements: Vec<Element>) -> Self {
        let mut topo = Self::default();
        for element in elements {
            match element {
                Element::Node { id, lat, lon, tags } => {
                    let seen = topo.coords.insert(id, Coord { x: lon, y: lat }).is_some();
                    let known = seen && topo.tagged_nodes.iter().any(|(n, _)| *n == id);
                    if !tags.is_empty() && !known {
                        topo.tagged_nodes.push((id, tags));
                    }
                }
                Element::Way { id, nodes, tags } => match topo.way_index.get(&id) {
                    Some(&idx) => {
                        let way = &mut topo.ways[idx];
                        if way.nodes.is_empty() {
                            way.nodes = nodes;
                        }
                        if way.tags.is_empty() {
                            way.tags = tags;
                        }
                    }
                    None => {
                        topo.way_index.insert(id, topo.ways.len());
                        topo.ways.push(Way { id, nodes, tags });
                    }
                },
                Element::Relation { id, members, tags } => match topo.relation_index.get(&id) {
                    Some(&idx) => {
                        let relation = &mut topo.relations[idx];
                        if relation.members.is_empty() {
                            relation.members = members;
                        }
                        if relation.tags.is_empty() {
                            relation.tags = tags;
                        }
                    }
                    None => {
                        topo.relation_index.insert(id, topo.relations.len());
                        topo.relations.push(Relation { id, members, tags });
                    }
                },
                Element::Other => (),
            }
        }
        topo
    }

    fn features(&self) -> Vec<Feature> {
        let area_members: HashSet<i64> = self
            .relations
            .iter()
            .filter(|r| is_area_relation(&r.tags))
            .flat_map(|r| r.members.iter())
            .filter(|m| m.kind == "way")
            .map(|m| m.id)
            .collect();

        let mut features = Vec::new();

        for way in &self.ways {
            if way.tags.is_empty() && area_members.contains(&way.id) {
                continue;
            }
            let line = self.line(&way.nodes);
            if line.0.len() < 2 {
                debug!("way/{} has fewer than 2 resolvable nodes", way.id);
                continue;
            }
            let geometry = if line.is_closed() && line.0.len() >= 4 && is_area_way(&way.tags) {
                Geometry::Polygon(Polygon::new(line, vec![]))
            } else {
                Geometry::LineString(line)
            };
            features.push(feature(format!("way/{}", way.id), geometry, &way.tags));
        }

        for relation in &self.relations {
            if !is_area_relation(&relation.tags) {
                debug!("skipping non-area relation/{}", relation.id);
                continue;
            }
            match self.assemble(relation) {
                Some(geometry) => {
                    let id = format!("relation/{}", relation.id);
                    features.push(feature(id, geometry, &relation.tags));
                }
                None => warn!("relation/{} has no closed outer ring", relation.id),
            }
        }

        for (id, tags) in &self.tagged_nodes {
            if let Some(&coord) = self.coords.get(id) {
                features.push(feature(format!("node/{id}"), Point(coord).into(), tags));
            }
        }

        features
    }

    fn line(&self, nodes: &[i64]) -> LineString {
        nodes
            .iter()
            .filter_map(|id| self.coords.get(id).copied())
            .collect()
    }

    /// Builds a (multi)polygon from a relation's outer and inner ways.
    fn assemble(&self, relation: &Relation) -> Option<Geometry> {
        let mut outer = Vec::new();
        let mut inner = Vec::new();
        for member in relation.members.iter().filter(|m| m.kind == "way") {
            let Some(&idx) = self.way_index.get(&member.id) else {
                debug!("relation/{} is missing way/{}", relation.id, member.id);
                continue;
            };
            match member.role.as_str() {
                "inner" => inner.push(self.ways[idx].nodes.as_slice()),
                _ => outer.push(self.ways[idx].nodes.as_slice()),
            }
        }

        let mut polygons: Vec<(LineString, Vec<LineString>)> = join_rings(&outer)
            .iter()
            .map(|ring| self.line(ring))
            .filter(|ring| ring.0.len() >= 4)
            .map(|ring| (ring, Vec::new()))
            .collect();
        if polygons.is_empty() {
            return None;
        }

        for ring in join_rings(&inner).iter().map(|ring| self.line(ring)) {
            if ring.0.len() < 4 {
                continue;
            }
            let probe = Point(ring.0[0]);
            match polygons
                .iter_mut()
                .find(|(outer, _)| Polygon::new(outer.clone(), vec![]).contains(&probe))
            {
                Some((_, holes)) => holes.push(ring),
                None => debug!("relation/{} has an inner ring outside every outer", relation.id),
            }
        }

        let mut polygons: Vec<Polygon> = polygons
            .into_iter()
            .map(|(exterior, interiors)| Polygon::new(exterior, interiors))
            .collect();
        Some(if polygons.len() == 1 {
            Geometry::Polygon(polygons.remove(0))
        } else {
            Geometry::MultiPolygon(MultiPolygon(polygons))
        })
    }
}

fn feature(id: String, geometry: Geometry, tags: &Tags) -> Feature {
    Feature {
        id,
        geometry,
        properties: tags.clone(),
    }
}

fn is_area_relation(tags: &Tags) -> bool {
    matches!(
        tags.get("type").map(String::as_str),
        Some("multipolygon" | "boundary")
    )
}

/// Hole centerlines are frequently drawn tee to green and back, so
/// being closed doesn't make them areas.
fn is_area_way(tags: &Tags) -> bool {
    tags.get("area").map(String::as_str) != Some("no")
        && tags.get("golf").map(String::as_str) != Some("hole")
}

/// Stitches node sequences end to end into closed rings.
///
/// Sequences may need reversing to line up. Chains that never close
/// are dropped.
fn join_rings(ways: &[&[i64]]) -> Vec<Vec<i64>> {
    let mut pending: Vec<Vec<i64>> = ways
        .iter()
        .filter(|w| w.len() >= 2)
        .map(|w| w.to_vec())
        .collect();
    let mut rings = Vec::new();

    while !pending.is_empty() {
        let mut ring = pending.remove(0);
        loop {
            let (first, last) = (ring[0], ring[ring.len() - 1]);
            if first == last {
                rings.push(ring);
                break;
            }
            let Some(pos) = pending
                .iter()
                .position(|w| w[0] == last || w[w.len() - 1] == last)
            else {
                warn!("dropping unclosed ring starting at node/{first}");
                break;
            };
            let mut next = pending.remove(pos);
            if next[0] != last {
                next.reverse();
            }
            ring.extend(next.into_iter().skip(1));
        }
    }

    rings
}
