use clap::Args;
use geocache_core::{self as game, GameEvent, GameSession, NullSurface, SavedGame};
use web_sys::HtmlElement;
use yew::prelude::*;

use crate::locate::GeoWatch;
use crate::map::LeafletSurface;
use crate::utils::*;

impl StorageKey for SavedGame {
    const KEY: &'static str = "geocache:save:v1";
}

const RESET_PROMPT: &str =
    "Reset the game? Your coins, every cache you touched and your trail will be lost.";

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// How many tiles around the player hold caches, in each direction
    #[arg(long)]
    pub neighborhood_size: Option<u16>,

    /// Move the player wherever the map is clicked
    #[arg(long)]
    pub teleport: bool,
}

impl GameProps {
    pub(crate) fn config(&self) -> game::GameConfig {
        let config = game::GameConfig::default();
        match self.neighborhood_size {
            Some(neighborhood_size) => game::GameConfig::new(
                config.tile_degrees,
                neighborhood_size,
                config.cache_spawn_probability,
                config.initial_stock_bound,
                config.start,
            ),
            None => config,
        }
    }
}

pub(crate) enum Msg {
    Game(GameEvent),
    ConfirmReset,
}

pub(crate) struct GameView {
    session: GameSession,
    surface: Option<LeafletSurface>,
    geo_watch: Option<GeoWatch>,
    map_ref: NodeRef,
    status_ref: NodeRef,
    notice_ref: NodeRef,
}

impl GameView {
    fn attach_surface(&mut self, ctx: &Context<Self>) {
        let (Some(container), Some(status), Some(notice)) = (
            self.map_ref.cast::<HtmlElement>(),
            self.status_ref.cast::<web_sys::Element>(),
            self.notice_ref.cast::<web_sys::Element>(),
        ) else {
            log::error!("map elements are missing, nothing will be drawn");
            return;
        };

        let mut surface = LeafletSurface::new(
            &container,
            status,
            notice,
            self.session.config(),
            ctx.link().callback(Msg::Game),
            ctx.props().teleport,
        );
        self.session.render(&mut surface);
        self.surface = Some(surface);
    }

    /// Starts or stops following the device location to match the session.
    fn sync_geo_watch(&mut self, ctx: &Context<Self>) {
        match (self.session.auto_locate(), self.geo_watch.is_some()) {
            (true, false) => match GeoWatch::start(ctx.link().callback(Msg::Game)) {
                Ok(watch) => self.geo_watch = Some(watch),
                Err(reason) => ctx
                    .link()
                    .send_message(Msg::Game(GameEvent::LocationUnavailable(reason))),
            },
            (false, true) => self.geo_watch = None,
            _ => {}
        }
    }

    fn handle(&mut self, event: GameEvent) -> bool {
        let result = match self.surface.as_mut() {
            Some(surface) => self.session.handle(event, surface),
            None => self.session.handle(event, &mut NullSurface),
        };

        match result {
            Ok(updated) => {
                if updated {
                    self.session.to_saved().local_save();
                }
                updated
            }
            Err(err) => {
                log::warn!("event rejected: {}", err);
                false
            }
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let config = ctx.props().config();
        let session = match SavedGame::local_load() {
            Some(saved) => {
                log::info!("resuming saved game");
                GameSession::from_saved(config, saved)
            }
            None => GameSession::new(config),
        };

        Self {
            session,
            surface: None,
            geo_watch: None,
            map_ref: NodeRef::default(),
            status_ref: NodeRef::default(),
            notice_ref: NodeRef::default(),
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render {
            self.attach_surface(ctx);
            self.sync_geo_watch(ctx);
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use GameEvent::*;

        match msg {
            Msg::Game(event) => {
                let locate_changed = matches!(event, AutoLocateToggled(_) | ResetRequested);
                let updated = self.handle(event);
                if locate_changed {
                    self.sync_geo_watch(ctx);
                }
                updated && locate_changed
            }
            Msg::ConfirmReset => {
                if gloo::dialogs::confirm(RESET_PROMPT) {
                    ctx.link().send_message(Msg::Game(ResetRequested));
                }
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let step = |event: GameEvent| {
            ctx.link()
                .callback(move |_: MouseEvent| Msg::Game(event.clone()))
        };
        let auto_locate = self.session.auto_locate();
        let cb_toggle_locate = ctx
            .link()
            .callback(move |_: MouseEvent| Msg::Game(GameEvent::AutoLocateToggled(!auto_locate)));
        let cb_reset = ctx.link().callback(|_: MouseEvent| Msg::ConfirmReset);

        html! {
            <div class="geocache">
                <nav id="controlPanel">
                    <button title="north" onclick={step(GameEvent::NORTH)}>{"⬆️"}</button>
                    <button title="south" onclick={step(GameEvent::SOUTH)}>{"⬇️"}</button>
                    <button title="west" onclick={step(GameEvent::WEST)}>{"⬅️"}</button>
                    <button title="east" onclick={step(GameEvent::EAST)}>{"➡️"}</button>
                    <button
                        title="follow my location"
                        class={classes!(auto_locate.then_some("active"))}
                        onclick={cb_toggle_locate}
                    >
                        {"🌐"}
                    </button>
                    <button title="reset" onclick={cb_reset}>{"🚮"}</button>
                </nav>
                <div id="map" ref={self.map_ref.clone()}/>
                <aside id="statusPanel" ref={self.status_ref.clone()}/>
                <small id="notice" ref={self.notice_ref.clone()}/>
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_uses_versioned_namespace() {
        assert_eq!(<SavedGame as StorageKey>::KEY, "geocache:save:v1");
    }

    #[test]
    fn saved_coordinates_read_back_exactly() {
        let config = game::GameConfig::default();
        let mut saved = SavedGame::new(&config);
        let point = game::GeoPoint::new(46.956294795784004, -122.06277128548504);
        saved.player = point;
        saved.trail = vec![vec![config.start, point]];

        let json = serde_json::to_string(&saved).unwrap();
        let loaded: SavedGame = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.player.lat.to_bits(), point.lat.to_bits());
        assert_eq!(loaded, saved);
    }

    #[test]
    fn neighborhood_override_is_clamped_into_config() {
        let props = GameProps {
            neighborhood_size: Some(1_000),
            teleport: false,
        };

        let config = props.config();

        assert_eq!(config.neighborhood_size, game::GameConfig::MAX_NEIGHBORHOOD);
        assert_eq!(config.tile_degrees, game::GameConfig::default().tile_degrees);
    }

    #[test]
    fn default_props_keep_default_config() {
        let props = GameProps {
            neighborhood_size: None,
            teleport: false,
        };

        assert_eq!(props.config(), game::GameConfig::default());
    }
}
