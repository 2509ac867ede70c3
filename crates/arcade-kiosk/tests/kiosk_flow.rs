//! End-to-end runs through the kiosk host with real games.

use std::time::Duration;

use arcade_core::game_registry::GameRegistry;
use arcade_core::phase::Phase;
use arcade_core::prize::PrizeCategory;
use arcade_kiosk::runner::Reply;
use arcade_kiosk::{Kiosk, KioskConfig};

const FRAME: Duration = Duration::from_millis(100);

fn seeded(seed: u64, registry: GameRegistry) -> Kiosk {
    let config = KioskConfig {
        seed: Some(seed),
        ..KioskConfig::default()
    };
    Kiosk::new(&config, registry).unwrap()
}

fn wheel_only() -> GameRegistry {
    GameRegistry::new(vec![arcade_spin_wheel::descriptor()]).unwrap()
}

fn run_frames(kiosk: &mut Kiosk, frames: usize) {
    for _ in 0..frames {
        kiosk.tick(FRAME);
    }
}

#[test]
fn spin_until_a_prize_and_redeem_it() {
    let mut kiosk = seeded(2024, wheel_only());
    assert_eq!(kiosk.handle_line("start"), Reply::Nothing);
    kiosk.handle_line("select spin-wheel");
    assert_eq!(kiosk.session().phase(), Phase::Playing);

    // TRY AGAIN re-arms the wheel, so keep spinning until it pays.
    for _ in 0..40 {
        kiosk.handle_line("spin");
        run_frames(&mut kiosk, 55);
        if kiosk.session().phase() == Phase::Result {
            break;
        }
    }
    assert_eq!(kiosk.session().phase(), Phase::Result);
    let result = kiosk.session().result().cloned().unwrap();
    assert!(result.success());
    assert_eq!(result.score(), 100);
    assert!(PrizeCategory::of_label(result.prize_label()).is_some());
    assert!(kiosk.screen().contains(result.prize_label()));

    kiosk.handle_line("redeem");
    assert!(kiosk.screen().contains("PRIZE TICKET"));
    kiosk.handle_line("reset");
    assert_eq!(kiosk.session().phase(), Phase::Attract);
    assert!(kiosk.session().result().is_none());
}

#[test]
fn same_seed_same_outcome() {
    let outcome = |seed| {
        let mut kiosk = seeded(seed, wheel_only());
        kiosk.handle_line("start");
        kiosk.handle_line("select 1");
        let mut spins = 0;
        while kiosk.session().phase() == Phase::Playing && spins < 40 {
            kiosk.handle_line("spin");
            run_frames(&mut kiosk, 55);
            spins += 1;
        }
        (spins, kiosk.session().result().cloned())
    };
    assert_eq!(outcome(77), outcome(77));
}

#[test]
fn exit_mid_spin_returns_to_lobby_empty_handed() {
    let mut kiosk = seeded(3, wheel_only());
    kiosk.handle_line("start");
    kiosk.handle_line("select spin-wheel");
    kiosk.handle_line("spin");
    run_frames(&mut kiosk, 10);
    kiosk.handle_line("exit");
    assert_eq!(kiosk.session().phase(), Phase::Lobby);
    assert!(kiosk.session().active_game_id().is_none());
    assert!(kiosk.session().result().is_none());

    // Nothing from the abandoned spin reaches the lobby.
    run_frames(&mut kiosk, 60);
    assert_eq!(kiosk.session().phase(), Phase::Lobby);
}

#[test]
fn unknown_game_keeps_the_lobby() {
    let mut kiosk = seeded(4, wheel_only());
    kiosk.handle_line("start");
    assert_eq!(kiosk.handle_line("select pinball"), Reply::Nothing);
    assert_eq!(kiosk.session().phase(), Phase::Lobby);
    assert!(matches!(kiosk.handle_line("select 5"), Reply::Print(_)));
}

#[cfg(feature = "space-dodge")]
#[test]
fn aborting_a_pointer_game_frees_the_surface() {
    let registry = arcade_kiosk::catalog::default_registry().unwrap();
    let mut kiosk = seeded(5, registry);
    kiosk.handle_line("start");
    kiosk.handle_line("select space-dodge");
    assert_eq!(kiosk.session().surface().listener_count(), 1);
    kiosk.handle_line("move 20 20");
    kiosk.tick(FRAME);
    kiosk.handle_line("abort");
    assert_eq!(kiosk.session().phase(), Phase::Lobby);
    assert_eq!(kiosk.session().surface().listener_count(), 0);
}
