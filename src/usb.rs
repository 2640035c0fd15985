//! USB HID device for the jankpad
//!
//! Composite device with two HID interfaces:
//! - Interface 0: keyboard in the boot report layout (8-byte IN report, 1-byte LED OUT report)
//! - Interface 1: consumer control (2-byte IN report)
//!
//! Control requests are answered by [`HID_CONTROL`]; the keypad loop writes
//! reports through [`UsbTransport`].

use embassy_rp::peripherals;
use embassy_rp::usb::Driver;
use embassy_usb::class::hid::{
    Config as HidConfig, HidReader, HidReaderWriter, HidWriter, ReportId, RequestHandler, State,
};
use embassy_usb::control::{InResponse, OutResponse, Recipient, Request, RequestType};
use embassy_usb::{Builder, Config, Handler, UsbDevice};
use portable_atomic::{AtomicBool, Ordering};
use static_cell::StaticCell;

use crate::channels::{HID_CONTROL, NUM_LOCK};
use crate::config::*;
use crate::control::{HID_REQ_GET_PROTOCOL, HID_REQ_SET_PROTOCOL, KEYBOARD_INTERFACE};
use crate::error::Result;
use crate::report::{keyboard_report_descriptor, KeyboardReport, MediaReport, MEDIA_REPORT_DESCRIPTOR};
use crate::transport::HidTransport;

pub type UsbDriver = Driver<'static, peripherals::USB>;

/// Set while the host has the device configured
static CONFIGURED: AtomicBool = AtomicBool::new(false);

/// Keyboard and media interfaces
const HID_INTERFACE_COUNT: u16 = 2;

// ===================================================================
// USB Configuration
// ===================================================================

fn create_usb_config() -> Config<'static> {
    let mut config = Config::new(USB_VID, USB_PID);
    config.manufacturer = Some(USB_MANUFACTURER);
    config.product = Some(USB_PRODUCT);
    config.serial_number = Some(USB_SERIAL);
    config.max_power = USB_MAX_POWER_MA;
    config.max_packet_size_0 = 64;
    config.device_release = USB_BCD_DEVICE;

    // Interface-defined class, composite without IADs
    config.device_class = 0x00;
    config.device_sub_class = 0x00;
    config.device_protocol = 0x00;
    config.composite_with_iads = false;

    config
}

// ===================================================================
// HID Request Handler
// ===================================================================

/// Class request handler for one HID interface
struct JankHidHandler {
    interface: u16,
}

impl JankHidHandler {
    const fn new(interface: u16) -> Self {
        Self { interface }
    }
}

impl RequestHandler for JankHidHandler {
    fn get_report(&mut self, id: ReportId, buf: &mut [u8]) -> Option<usize> {
        debug!("HID {} Get Report: {:?}", self.interface, id);
        match id {
            ReportId::In(_) => HID_CONTROL.get_report(self.interface, buf),
            _ => None,
        }
    }

    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        debug!("HID {} Set Report: {:?}, len={}", self.interface, id, data.len());
        if self.interface != KEYBOARD_INTERFACE {
            return OutResponse::Rejected;
        }
        match HID_CONTROL.set_report(data) {
            Some(num_lock) => {
                NUM_LOCK.signal(num_lock);
                OutResponse::Accepted
            }
            None => OutResponse::Rejected,
        }
    }

    fn set_idle_ms(&mut self, _id: Option<ReportId>, duration_ms: u32) {
        HID_CONTROL.set_idle_duration(duration_ms);
    }

    fn get_idle_ms(&mut self, _id: Option<ReportId>) -> Option<u32> {
        Some(u32::from(HID_CONTROL.idle_ms()))
    }
}

// ===================================================================
// Device State Handler
// ===================================================================

struct DeviceStateHandler;

/// GET/SET_PROTOCOL addressed to one of our HID interfaces
fn is_protocol_request(req: &Request, code: u8) -> bool {
    req.request_type == RequestType::Class
        && req.recipient == Recipient::Interface
        && req.request == code
        && (req.index & 0xff) < HID_INTERFACE_COUNT
}

impl Handler for DeviceStateHandler {
    fn enabled(&mut self, enabled: bool) {
        CONFIGURED.store(false, Ordering::Release);
        // Num Lock is lit while enumerating, dark while unplugged
        NUM_LOCK.signal(enabled);
        if enabled {
            info!("USB: device enabled");
        } else {
            info!("USB: device disabled");
        }
    }

    fn reset(&mut self) {
        CONFIGURED.store(false, Ordering::Release);
        info!("USB: bus reset");
    }

    fn addressed(&mut self, addr: u8) {
        CONFIGURED.store(false, Ordering::Release);
        info!("USB: address set to {}", addr);
    }

    fn configured(&mut self, configured: bool) {
        CONFIGURED.store(configured, Ordering::Release);
        if configured {
            HID_CONTROL.reset_protocol();
            info!("USB: configured");
        } else {
            NUM_LOCK.signal(false);
            info!("USB: deconfigured");
        }
    }

    // Registered ahead of the HID classes, so the protocol requests land here
    fn control_out(&mut self, req: Request, _data: &[u8]) -> Option<OutResponse> {
        if !is_protocol_request(&req, HID_REQ_SET_PROTOCOL) {
            return None;
        }
        let value = (req.value & 0xff) as u8;
        debug!("USB: set protocol {}", value);
        HID_CONTROL.set_protocol(value);
        Some(OutResponse::Accepted)
    }

    fn control_in<'a>(&'a mut self, req: Request, buf: &'a mut [u8]) -> Option<InResponse<'a>> {
        if !is_protocol_request(&req, HID_REQ_GET_PROTOCOL) {
            return None;
        }
        let out = buf.first_mut()?;
        *out = HID_CONTROL.get_protocol();
        Some(InResponse::Accepted(&buf[..1]))
    }

    fn suspended(&mut self, suspended: bool) {
        if suspended {
            CONFIGURED.store(false, Ordering::Release);
            info!("USB: suspended");
        } else {
            info!("USB: resumed");
        }
    }
}

// ===================================================================
// Report Transport
// ===================================================================

/// Keypad side of the USB device: the two IN endpoints
pub struct UsbTransport {
    keyboard: HidWriter<'static, UsbDriver, KEYBOARD_REPORT_SIZE>,
    media: HidWriter<'static, UsbDriver, MEDIA_REPORT_SIZE>,
}

impl HidTransport for UsbTransport {
    fn is_ready(&self) -> bool {
        CONFIGURED.load(Ordering::Acquire)
    }

    async fn write_keyboard(&mut self, report: &KeyboardReport) -> Result<()> {
        self.keyboard.write(&report.to_bytes()).await?;
        Ok(())
    }

    async fn write_media(&mut self, report: &MediaReport) -> Result<()> {
        self.media.write(&report.to_bytes()).await?;
        Ok(())
    }
}

/// Everything `init_usb` hands out: the device to run, the LED report reader
/// and the report transport.
pub struct UsbParts {
    pub device: UsbDevice<'static, UsbDriver>,
    pub led_reader: HidReader<'static, UsbDriver, LED_REPORT_SIZE>,
    pub transport: UsbTransport,
}

/// Build the composite HID device. Must be called once.
pub fn init_usb(driver: UsbDriver) -> UsbParts {
    static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static MSOS_DESC: StaticCell<[u8; 128]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
    static DEVICE_HANDLER: StaticCell<DeviceStateHandler> = StaticCell::new();
    static KEYBOARD_STATE: StaticCell<State> = StaticCell::new();
    static MEDIA_STATE: StaticCell<State> = StaticCell::new();
    static KEYBOARD_HANDLER: StaticCell<JankHidHandler> = StaticCell::new();
    static MEDIA_HANDLER: StaticCell<JankHidHandler> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        create_usb_config(),
        CONFIG_DESC.init([0; 256]),
        BOS_DESC.init([0; 256]),
        MSOS_DESC.init([0; 128]),
        CONTROL_BUF.init([0; 64]),
    );
    builder.handler(DEVICE_HANDLER.init(DeviceStateHandler));

    let keyboard_config = HidConfig {
        report_descriptor: keyboard_report_descriptor(),
        request_handler: Some(KEYBOARD_HANDLER.init(JankHidHandler::new(KEYBOARD_INTERFACE))),
        poll_ms: USB_POLL_RATE_MS,
        max_packet_size: 64,
    };
    let keyboard = HidReaderWriter::<_, LED_REPORT_SIZE, KEYBOARD_REPORT_SIZE>::new(
        &mut builder,
        KEYBOARD_STATE.init(State::new()),
        keyboard_config,
    );

    let media_config = HidConfig {
        report_descriptor: MEDIA_REPORT_DESCRIPTOR,
        request_handler: Some(MEDIA_HANDLER.init(JankHidHandler::new(KEYBOARD_INTERFACE + 1))),
        poll_ms: USB_POLL_RATE_MS,
        max_packet_size: 64,
    };
    let media = HidWriter::<_, MEDIA_REPORT_SIZE>::new(
        &mut builder,
        MEDIA_STATE.init(State::new()),
        media_config,
    );

    info!(
        "HID descriptors: keyboard {} bytes, media {} bytes",
        keyboard_report_descriptor().len(),
        MEDIA_REPORT_DESCRIPTOR.len()
    );

    let device = builder.build();
    let (led_reader, keyboard) = keyboard.split();

    UsbParts {
        device,
        led_reader,
        transport: UsbTransport { keyboard, media },
    }
}

// ===================================================================
// USB Tasks
// ===================================================================

/// Run the USB device stack
#[embassy_executor::task]
pub async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB task started");
    device.run().await
}

/// Receive LED output reports on the keyboard interface
#[embassy_executor::task]
pub async fn led_report_task(reader: HidReader<'static, UsbDriver, LED_REPORT_SIZE>) -> ! {
    let mut handler = JankHidHandler::new(KEYBOARD_INTERFACE);
    reader.run(false, &mut handler).await
}
