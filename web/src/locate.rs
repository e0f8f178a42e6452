use geocache_core::{GameEvent, GeoPoint};
use gloo::utils::window;
use wasm_bindgen::prelude::*;
use web_sys::{Geolocation, Position as GeolocationPosition, PositionError as GeolocationPositionError, PositionOptions};
use yew::Callback;

/// Active `navigator.geolocation.watchPosition` subscription, cleared on drop.
pub(crate) struct GeoWatch {
    geolocation: Geolocation,
    watch_id: i32,
    _on_fix: Closure<dyn FnMut(GeolocationPosition)>,
    _on_error: Closure<dyn FnMut(GeolocationPositionError)>,
}

impl GeoWatch {
    const TIMEOUT_MS: u32 = 10_000;

    pub(crate) fn start(on_event: Callback<GameEvent>) -> Result<Self, String> {
        let geolocation = window()
            .navigator()
            .geolocation()
            .map_err(|err| format!("geolocation is not supported ({:?})", err))?;

        let on_fix = {
            let on_event = on_event.clone();
            Closure::<dyn FnMut(GeolocationPosition)>::new(move |position: GeolocationPosition| {
                let coords = position.coords();
                let point = GeoPoint::new(coords.latitude(), coords.longitude());
                log::debug!("location fix: {:?}", point);
                on_event.emit(GameEvent::LocationFix(point));
            })
        };
        let on_error = Closure::<dyn FnMut(GeolocationPositionError)>::new(
            move |err: GeolocationPositionError| {
                on_event.emit(GameEvent::LocationUnavailable(err.message()));
            },
        );

        let options = PositionOptions::new();
        options.set_enable_high_accuracy(true);
        options.set_timeout(Self::TIMEOUT_MS);

        let watch_id = geolocation
            .watch_position_with_error_callback_and_options(
                on_fix.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
                &options,
            )
            .map_err(|err| format!("could not watch position ({:?})", err))?;
        log::info!("watching position (id {})", watch_id);

        Ok(Self {
            geolocation,
            watch_id,
            _on_fix: on_fix,
            _on_error: on_error,
        })
    }
}

impl Drop for GeoWatch {
    fn drop(&mut self) {
        log::info!("stopped watching position (id {})", self.watch_id);
        self.geolocation.clear_watch(self.watch_id);
    }
}
