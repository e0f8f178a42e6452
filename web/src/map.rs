use std::collections::{BTreeMap, HashMap};

use geocache_core::{Cell, GameConfig, GameEvent, GeoBounds, GeoPoint, Geocache, MapSurface, Stock};
use gloo::events::EventListener;
use gloo::utils::document;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement};
use yew::Callback;

use crate::leaflet::{self, LayerGroup, LeafletMouseEvent, Map, Marker, Polyline};
use crate::utils::format_coin_count;

const TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"http://www.openstreetmap.org/copyright\">OpenStreetMap</a>";
const TRAIL_COLOR: &str = "crimson";

/// Overlay groups drawn on top of the tiles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum MapLayer {
    Caches,
    Trail,
}

impl MapLayer {
    const ALL: [MapLayer; 2] = [MapLayer::Caches, MapLayer::Trail];
}

fn create_element(tag: &str, class: &str) -> Element {
    let element = document()
        .create_element(tag)
        .expect("tag name must be valid");
    element.set_class_name(class);
    element
}

fn append(parent: &Element, child: &Element) {
    if let Err(err) = parent.append_child(child) {
        log::error!("failed to append <{}>: {:?}", child.tag_name(), err);
    }
}

/// Popup contents of one cache rectangle.
struct CacheOverlay {
    count: Element,
    coins: Element,
    _listeners: [EventListener; 2],
}

impl CacheOverlay {
    fn new(cell: Cell, on_event: &Callback<GameEvent>) -> (Self, Element) {
        let root = create_element("div", "cache-popup");

        let summary = create_element("div", "summary");
        let count = create_element("span", "count");
        summary.set_text_content(Some(&format!("Cache at \"{}\" has ", cell)));
        append(&summary, &count);
        append(&root, &summary);

        let coins = create_element("ul", "coins");
        append(&root, &coins);

        let collect = create_element("button", "collect");
        collect.set_text_content(Some("collect"));
        let deposit = create_element("button", "deposit");
        deposit.set_text_content(Some("deposit"));
        append(&root, &collect);
        append(&root, &deposit);

        let listeners = [
            {
                let on_event = on_event.clone();
                EventListener::new(&collect, "click", move |_| {
                    on_event.emit(GameEvent::CollectRequested(cell))
                })
            },
            {
                let on_event = on_event.clone();
                EventListener::new(&deposit, "click", move |_| {
                    on_event.emit(GameEvent::DepositRequested(cell))
                })
            },
        ];

        let overlay = Self {
            count,
            coins,
            _listeners: listeners,
        };
        (overlay, root)
    }

    fn update(&self, cache: &Geocache) {
        let count = match cache.len() {
            1 => "1 coin".to_string(),
            n => format!("{} coins", n),
        };
        self.count.set_text_content(Some(&count));

        self.coins.set_text_content(None);
        for coin in cache.coins() {
            let item = create_element("li", "coin");
            item.set_text_content(Some(&coin.to_string()));
            append(&self.coins, &item);
        }
    }
}

/// Draws the game onto a Leaflet map.
pub(crate) struct LeafletSurface {
    map: Map,
    player_marker: Marker,
    layers: HashMap<MapLayer, LayerGroup>,
    overlays: BTreeMap<Cell, CacheOverlay>,
    trail: Vec<Polyline>,
    status: Element,
    notice: Element,
    on_event: Callback<GameEvent>,
    _on_click: Option<Closure<dyn FnMut(LeafletMouseEvent)>>,
}

impl LeafletSurface {
    pub(crate) fn new(
        container: &HtmlElement,
        status: Element,
        notice: Element,
        config: &GameConfig,
        on_event: Callback<GameEvent>,
        teleport: bool,
    ) -> Self {
        let start: leaflet::LatLng = config.start.into();
        let map = leaflet::new_map(
            container,
            &leaflet::options(&[
                ("center", start.clone().into()),
                ("zoom", config.zoom.into()),
                ("minZoom", config.zoom.into()),
                ("maxZoom", config.zoom.into()),
                ("zoomControl", false.into()),
                ("scrollWheelZoom", false.into()),
            ]),
        );

        leaflet::tile_layer(
            TILE_URL,
            &leaflet::options(&[
                ("maxZoom", 19_u8.into()),
                ("attribution", TILE_ATTRIBUTION.into()),
            ]),
        )
        .add_to(&map);

        let layers = MapLayer::ALL
            .into_iter()
            .map(|layer| {
                let group = leaflet::layer_group();
                group.add_to(&map);
                (layer, group)
            })
            .collect();

        let player_marker = leaflet::marker(&start);
        player_marker.bind_tooltip("That's you!");
        player_marker.add_to(&map);

        let on_click = teleport.then(|| {
            let on_event = on_event.clone();
            let closure = Closure::<dyn FnMut(LeafletMouseEvent)>::new(move |e: LeafletMouseEvent| {
                on_event.emit(GameEvent::PlayerMoved(GeoPoint::from(&e.latlng())))
            });
            map.on("click", closure.as_ref().unchecked_ref());
            closure
        });

        Self {
            map,
            player_marker,
            layers,
            overlays: BTreeMap::new(),
            trail: Vec::new(),
            status,
            notice,
            on_event,
            _on_click: on_click,
        }
    }

    fn layer(&self, layer: MapLayer) -> Option<&LayerGroup> {
        let group = self.layers.get(&layer);
        if group.is_none() {
            log::error!("layer not found: {:?}", layer);
            debug_assert!(false, "layer {:?} was never added to the map", layer);
        }
        group
    }
}

impl MapSurface for LeafletSurface {
    fn render_cache(&mut self, cache: &Geocache, bounds: GeoBounds) {
        let cell = cache.cell();
        if let Some(overlay) = self.overlays.get(&cell) {
            overlay.update(cache);
            return;
        }

        let (overlay, popup) = CacheOverlay::new(cell, &self.on_event);
        overlay.update(cache);

        let rect = leaflet::rectangle(&leaflet::bounds_array(bounds));
        rect.bind_popup(&popup);
        if let Some(group) = self.layer(MapLayer::Caches) {
            group.add_layer(&rect);
        }
        self.overlays.insert(cell, overlay);
    }

    fn remove_all_cache_overlays(&mut self) {
        if let Some(group) = self.layer(MapLayer::Caches) {
            group.clear_layers();
        }
        self.overlays.clear();
    }

    fn render_trail_segment(&mut self, index: usize, points: &[GeoPoint]) {
        let lat_lngs = leaflet::points_array(points);
        if let Some(line) = self.trail.get(index) {
            line.set_lat_lngs(&lat_lngs);
            return;
        }

        let line = leaflet::polyline(&lat_lngs, &leaflet::options(&[("color", TRAIL_COLOR.into())]));
        if let Some(group) = self.layer(MapLayer::Trail) {
            group.add_layer(&line);
        }
        self.trail.push(line);
    }

    fn clear_trail(&mut self) {
        if let Some(group) = self.layer(MapLayer::Trail) {
            group.clear_layers();
        }
        self.trail.clear();
    }

    fn set_status_text(&mut self, coin_count: usize) {
        self.status
            .set_text_content(Some(&format_coin_count(coin_count)));
    }

    fn center_map_on(&mut self, point: GeoPoint) {
        let lat_lng: leaflet::LatLng = point.into();
        self.player_marker.set_lat_lng(&lat_lng);
        self.map.pan_to(&lat_lng);
    }

    fn show_notice(&mut self, message: &str) {
        log::warn!("{}", message);
        self.notice.set_text_content(Some(message));
    }
}

impl Drop for LeafletSurface {
    fn drop(&mut self) {
        self.map.remove();
    }
}
