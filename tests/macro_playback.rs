mod common;

use common::*;
use embassy_futures::block_on;
use jankpad::config::{DEBOUNCE_MS, MAX_KEYS, WAIT_STEP_MS};
use jankpad::keymap::MacroTable;
use jankpad::macros::{decode_sequence, Macro, MacroAction, RawMacroAction};
use jankpad::matrix::KeyPosition;
use jankpad::player::{MacroPlayer, MacroState};
use jankpad::report::KeyboardReport;
use jankpad::scancode::*;
use jankpad::transport::HidTransport;

const SCENARIO: Macro = &[
    MacroAction::Keys(&[LEFT_GUI]),
    MacroAction::Wait(&[1]),
    MacroAction::Type(b"ab"),
    MacroAction::Keys(&[ENTER]),
];

const TABLE: MacroTable = [[&[], SCENARIO, &[], &[]]];

fn combo(keys: &[Keycode], modifier: u8) -> KeyboardReport {
    let mut keycodes = [0; MAX_KEYS];
    keycodes[..keys.len()].copy_from_slice(keys);
    KeyboardReport::single(keycodes, modifier)
}

#[test]
fn scenario_plays_in_order_then_waits_for_release() {
    use Record::*;

    let board = Board::new();
    let mut matrix = board.matrix();
    let log = new_log();
    let key = KeyPosition::new(0, 1);

    // 4 keep-alives during the wait, 2 while typing, then 2 more while held
    let mut transport = RecordingTransport::new(&log).release_macro_after(8, &board, key);
    let mut delay = RecordingDelay::new(&log);
    let mut player = MacroPlayer::new();

    board.press_macro(key);
    let played = block_on(player.service(&mut matrix, &TABLE, &mut transport, &mut delay));

    assert_eq!(played, Some(key));
    assert_eq!(player.state(), MacroState::Idle);

    let quarter = DelayMs(WAIT_STEP_MS);
    let expected = [
        // KEYS [LeftGui]
        Keyboard(combo(&[], 0b0000_1000)),
        DelayMs(DEBOUNCE_MS),
        Keyboard(KeyboardReport::EMPTY),
        // WAIT [1]
        quarter,
        KeepAlive,
        quarter,
        KeepAlive,
        quarter,
        KeepAlive,
        quarter,
        KeepAlive,
        // STRING "ab"
        Keyboard(KeyboardReport::for_char('a')),
        Keyboard(KeyboardReport::EMPTY),
        KeepAlive,
        Keyboard(KeyboardReport::for_char('b')),
        Keyboard(KeyboardReport::EMPTY),
        KeepAlive,
        // KEYS [Enter]
        Keyboard(combo(&[ENTER], 0)),
        DelayMs(DEBOUNCE_MS),
        Keyboard(KeyboardReport::EMPTY),
        // Held until released
        KeepAlive,
        KeepAlive,
        Keyboard(KeyboardReport::EMPTY),
    ];
    assert_eq!(*log.borrow(), expected);
}

#[test]
fn wait_pauses_about_one_second() {
    let board = Board::new();
    let mut matrix = board.matrix();
    let log = new_log();
    let key = KeyPosition::new(0, 1);
    let mut transport = RecordingTransport::new(&log).release_macro_after(6, &board, key);
    let mut delay = RecordingDelay::new(&log);

    board.press_macro(key);
    block_on(MacroPlayer::new().service(&mut matrix, &TABLE, &mut transport, &mut delay));

    let records = log.borrow();
    let gui_release = records
        .iter()
        .position(|r| *r == Record::Keyboard(KeyboardReport::EMPTY))
        .unwrap();
    let a_press = records
        .iter()
        .position(|r| *r == Record::Keyboard(KeyboardReport::for_char('a')))
        .unwrap();

    let paused: u32 = records[gui_release..a_press]
        .iter()
        .map(|r| match r {
            Record::DelayMs(ms) => *ms,
            _ => 0,
        })
        .sum();
    assert_eq!(paused, 1000);
}

#[test]
fn no_macro_key_plays_nothing() {
    let board = Board::new();
    let mut matrix = board.matrix();
    let log = new_log();
    let mut transport = RecordingTransport::new(&log);
    let mut delay = RecordingDelay::new(&log);
    let mut player = MacroPlayer::new();

    let played = block_on(player.service(&mut matrix, &TABLE, &mut transport, &mut delay));
    assert_eq!(played, None);
    assert!(log.borrow().is_empty());
    assert_eq!(player.state(), MacroState::Idle);
}

#[test]
fn empty_macro_only_waits_for_release() {
    let board = Board::new();
    let mut matrix = board.matrix();
    let log = new_log();
    let key = KeyPosition::new(0, 0);
    let mut transport = RecordingTransport::new(&log).release_macro_after(3, &board, key);
    let mut delay = RecordingDelay::new(&log);

    board.press_macro(key);
    let played = block_on(MacroPlayer::new().service(&mut matrix, &TABLE, &mut transport, &mut delay));

    assert_eq!(played, Some(key));
    assert_eq!(
        *log.borrow(),
        [
            Record::KeepAlive,
            Record::KeepAlive,
            Record::KeepAlive,
            Record::Keyboard(KeyboardReport::EMPTY)
        ]
    );
}

#[test]
fn combo_sends_wait_for_a_ready_endpoint() {
    struct SlowStart {
        inner: RecordingTransport,
        ready_after: usize,
    }

    impl HidTransport for SlowStart {
        fn is_ready(&self) -> bool {
            self.inner.keep_alives >= self.ready_after
        }

        async fn write_keyboard(&mut self, report: &KeyboardReport) -> jankpad::Result<()> {
            assert!(self.is_ready());
            self.inner.write_keyboard(report).await
        }

        async fn write_media(&mut self, report: &jankpad::report::MediaReport) -> jankpad::Result<()> {
            self.inner.write_media(report).await
        }

        async fn keep_alive(&mut self) {
            self.inner.keep_alive().await
        }
    }

    let log = new_log();
    let mut transport = SlowStart {
        inner: RecordingTransport::new(&log),
        ready_after: 3,
    };
    let mut delay = RecordingDelay::new(&log);

    block_on(MacroPlayer::new().play(&[MacroAction::Keys(&[A])], &mut transport, &mut delay));

    assert_eq!(
        reports(&log),
        [
            Record::Keyboard(combo(&[A], 0)),
            Record::Keyboard(KeyboardReport::EMPTY)
        ]
    );
    assert_eq!(transport.inner.keep_alives, 3);
}

#[test]
fn decoded_wire_sequence_plays_like_the_typed_one() {
    let typed = [
        MacroAction::Type(b"Hi"),
        MacroAction::Keys(&[LEFT_CONTROL, C]),
        MacroAction::Wait(&[1]),
    ];
    let mut raw: Vec<RawMacroAction> = typed.iter().map(RawMacroAction::from).collect();
    raw.push(RawMacroAction::END);
    // Never reached: the terminator ends the sequence
    raw.push(RawMacroAction::string(b"ignored"));

    let decoded: Vec<MacroAction> = decode_sequence(&raw).collect();
    assert_eq!(decoded, typed);

    fn play(actions: &[MacroAction<'_>]) -> Vec<Record> {
        let log = new_log();
        let mut transport = RecordingTransport::new(&log);
        let mut delay = RecordingDelay::new(&log);
        block_on(MacroPlayer::new().play(actions, &mut transport, &mut delay));
        let records = log.borrow().clone();
        records
    }

    let from_wire = play(&decoded);
    assert_eq!(from_wire, play(&typed));
    assert_eq!(
        from_wire.first(),
        Some(&Record::Keyboard(KeyboardReport::for_char('H')))
    );
}
