use geo_types::{coord, Geometry as GeoGeometry, Rect};
use tilejoin::functions::geometric_operations::{area, union};
use tilejoin::Geometry;

fn main() {
    let r1 = Rect::new(coord!{x:0.1, y:-89.83940678462318}, coord!{x:0.2, y:-89.73940678462318});
    let r2 = Rect::new(coord!{x:47.91453148946544, y:0.0}, coord!{x:47.91453148946544+0.0, y:6.942620372754308});
    // recompute properly from failing input printed
    let g1 = Geometry::new(GeoGeometry::Polygon(r1.to_polygon()));
    let g2 = Geometry::new(GeoGeometry::Polygon(r2.to_polygon()));
    let a1 = area(&g1).unwrap();
    let a2 = area(&g2).unwrap();
    let u = area(&union(&g1,&g2).unwrap()).unwrap();
    println!("a1={} a2={} sum={} union={}", a1, a2, a1+a2, u);
}
