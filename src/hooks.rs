use gloo_timers::callback::{Interval, Timeout};
use lapboard::rotation::{FlashSignal, SponsorRotation};
use std::rc::Rc;
use yew::prelude::*;

// Reducer wrapper so interval ticks always advance the latest index.
#[derive(Default, PartialEq)]
struct RotationState(SponsorRotation);

impl Reducible for RotationState {
    /// Length of the sponsor list at tick time.
    type Action = usize;

    fn reduce(self: Rc<Self>, len: usize) -> Rc<Self> {
        let mut next = self.0;
        next.advance(len);
        Rc::new(Self(next))
    }
}

/// Advance through `len` sponsors every `period_ms`.
///
/// The interval is only running while there is more than one sponsor, and is
/// dropped (cancelled) when `len` changes or the component unmounts.
#[hook]
pub fn use_sponsor_rotation(len: usize, period_ms: u32) -> SponsorRotation {
    let rotation = use_reducer(RotationState::default);

    {
        let dispatcher = rotation.dispatcher();
        use_effect_with(len, move |&len| {
            let interval =
                (len > 1).then(|| Interval::new(period_ms, move || dispatcher.dispatch(len)));
            move || drop(interval)
        });
    }

    rotation.0
}

/// State and controls for the "new fastest lap" banner.
#[derive(Clone)]
pub struct FlashHandle {
    pub active: bool,
    /// Raise the banner, restarting the countdown if it is already up.
    pub trigger: Callback<()>,
    /// Lower the banner now and cancel the countdown.
    pub clear: Callback<()>,
}

/// Banner that lowers itself `duration_ms` after the latest trigger.
#[hook]
pub fn use_flash(duration_ms: u32) -> FlashHandle {
    let active = use_state(|| false);
    let signal = use_mut_ref(FlashSignal::default);
    let pending = use_mut_ref(|| None::<Timeout>);

    let trigger = {
        let active = active.clone();
        let signal = signal.clone();
        let pending = pending.clone();
        Callback::from(move |_: ()| {
            let generation = signal.borrow_mut().trigger();
            active.set(true);

            let active = active.clone();
            let signal = signal.clone();
            let timeout = Timeout::new(duration_ms, move || {
                if signal.borrow_mut().expire(generation) {
                    active.set(false);
                }
            });
            // replacing the handle cancels the previous countdown
            *pending.borrow_mut() = Some(timeout);
        })
    };

    let clear = {
        let active = active.clone();
        Callback::from(move |_: ()| {
            signal.borrow_mut().clear();
            pending.borrow_mut().take();
            active.set(false);
        })
    };

    FlashHandle {
        active: *active,
        trigger,
        clear,
    }
}
