//! Minimal bindings for the parts of Leaflet the game uses.
//!
//! Leaflet itself is loaded by `index.html` as the global `L`.

use geocache_core::{GeoBounds, GeoPoint};
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement};

#[wasm_bindgen]
extern "C" {
    pub type Layer;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Layer, map: &Map) -> Layer;

    #[wasm_bindgen(method, js_name = bindPopup)]
    pub fn bind_popup(this: &Layer, content: &Element) -> Layer;

    #[wasm_bindgen(method, js_name = bindTooltip)]
    pub fn bind_tooltip(this: &Layer, content: &str) -> Layer;

    pub type Map;

    #[wasm_bindgen(js_namespace = L, js_name = map)]
    pub fn new_map(element: &HtmlElement, options: &JsValue) -> Map;

    #[wasm_bindgen(method, js_name = panTo)]
    pub fn pan_to(this: &Map, center: &LatLng) -> Map;

    #[wasm_bindgen(method)]
    pub fn on(this: &Map, event: &str, handler: &Function) -> Map;

    #[wasm_bindgen(method)]
    pub fn remove(this: &Map) -> Map;

    pub type LatLng;

    #[wasm_bindgen(js_namespace = L, js_name = latLng)]
    pub fn lat_lng(lat: f64, lng: f64) -> LatLng;

    #[wasm_bindgen(method, getter)]
    pub fn lat(this: &LatLng) -> f64;

    #[wasm_bindgen(method, getter)]
    pub fn lng(this: &LatLng) -> f64;

    pub type LeafletMouseEvent;

    #[wasm_bindgen(method, getter)]
    pub fn latlng(this: &LeafletMouseEvent) -> LatLng;

    #[wasm_bindgen(extends = Layer)]
    pub type TileLayer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    pub fn tile_layer(url_template: &str, options: &JsValue) -> TileLayer;

    #[wasm_bindgen(extends = Layer)]
    pub type LayerGroup;

    #[wasm_bindgen(js_namespace = L, js_name = layerGroup)]
    pub fn layer_group() -> LayerGroup;

    #[wasm_bindgen(method, js_name = addLayer)]
    pub fn add_layer(this: &LayerGroup, layer: &Layer) -> LayerGroup;

    #[wasm_bindgen(method, js_name = clearLayers)]
    pub fn clear_layers(this: &LayerGroup) -> LayerGroup;

    #[wasm_bindgen(extends = Layer)]
    pub type Rectangle;

    #[wasm_bindgen(js_namespace = L, js_name = rectangle)]
    pub fn rectangle(bounds: &Array) -> Rectangle;

    #[wasm_bindgen(extends = Layer)]
    pub type Polyline;

    #[wasm_bindgen(js_namespace = L, js_name = polyline)]
    pub fn polyline(lat_lngs: &Array, options: &JsValue) -> Polyline;

    #[wasm_bindgen(method, js_name = setLatLngs)]
    pub fn set_lat_lngs(this: &Polyline, lat_lngs: &Array) -> Polyline;

    #[wasm_bindgen(extends = Layer)]
    pub type Marker;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    pub fn marker(lat_lng: &LatLng) -> Marker;

    #[wasm_bindgen(method, js_name = setLatLng)]
    pub fn set_lat_lng(this: &Marker, lat_lng: &LatLng) -> Marker;
}

impl From<GeoPoint> for LatLng {
    fn from(point: GeoPoint) -> Self {
        lat_lng(point.lat, point.lng)
    }
}

impl From<&LatLng> for GeoPoint {
    fn from(lat_lng: &LatLng) -> Self {
        GeoPoint::new(lat_lng.lat(), lat_lng.lng())
    }
}

/// `[[lat, lng], ...]`, the shape Leaflet accepts for polylines.
pub fn points_array(points: &[GeoPoint]) -> Array {
    points
        .iter()
        .map(|point| Array::of2(&point.lat.into(), &point.lng.into()))
        .collect()
}

pub fn bounds_array(bounds: GeoBounds) -> Array {
    points_array(&[bounds.south_west, bounds.north_east])
}

/// Builds a plain JS options object.
pub fn options(entries: &[(&str, JsValue)]) -> JsValue {
    let object = Object::new();
    for (key, value) in entries {
        if let Err(err) = Reflect::set(&object, &JsValue::from_str(key), value) {
            log::error!("failed to set option {}: {:?}", key, err);
        }
    }
    object.into()
}
