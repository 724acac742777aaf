// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi benötigt dynamischen Speicher)
extern crate alloc;

// Embassy Async Runtime
use defmt::info;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Stack, StackResources};
use embassy_time::{Duration, Timer};

// ESP32-S3 HAL
use esp_hal::clock::CpuClock;
use esp_hal::rng::Rng;
use esp_hal::spi::Mode;
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use static_cell::StaticCell;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

// Projekt-Module und Konfiguration
use pov_core::StripLane;
use pov_core::config::{HORIZONTAL_RESOLUTION, INACTIVE_COLOR, LED_COUNT, VERTICAL_RESOLUTION};
use pov_firmware::config::{
    COLUMN_BYTES, EXTRA_HEAP_SIZE, HTTP_TASK_POOL_SIZE, SPI_FREQUENCY_MHZ, WIFI_HEAP_SIZE,
};
use pov_firmware::hal::{DmaColumn, SpiStrip, hall};
use pov_firmware::regions::REGIONS;
use pov_firmware::tasks::{
    connection_task, dhcp_task, http_server_task, net_task, refresh_task, rotor_task,
};
use pov_firmware::{ColumnPipeline, PovContext, Renderer};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// Ein Spalten-Buffer im DMA-Speicher
///
/// Jede Expansion legt eigenen statischen Speicher an, daher als Makro
/// statt als Funktion.
macro_rules! column_buffer {
    () => {
        DmaColumn::new(esp_hal::dma_tx_buffer!(COLUMN_BYTES).expect("Failed to allocate DMA buffer"))
    };
}

/// SPI-Konfiguration beider Strips (Mode 0, MSB first)
fn spi_config() -> SpiConfig {
    SpiConfig::default()
        .with_frequency(Rate::from_mhz(SPI_FREQUENCY_MHZ))
        .with_mode(Mode::_0)
}

/// Main Entry Point
///
/// Initialisiert Hardware, Pipeline und WiFi, spawnt die Tasks.
/// Danach schläft main() - alle Arbeit läuft in Tasks und im Hall-Interrupt.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // ESP32-S3 Konfiguration: CPU auf maximale Taktfrequenz (240 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Heap Allocator initialisieren (WiFi braucht dynamischen Speicher!)
    // Zwei Bereiche: reclaimed RAM (64 KB) + extra (36 KB) = 100 KB total
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!(
        "POV: {} LEDs per strip, {}x{} frame, {} regions",
        LED_COUNT,
        HORIZONTAL_RESOLUTION,
        VERTICAL_RESOLUTION,
        REGIONS.len()
    );

    // ------------------------------------------------------------------------
    // Kontext: Tracker, Frame Store, geteilter Status
    // ------------------------------------------------------------------------

    // init_with baut den Kontext direkt in der StaticCell (Frame Store ~100 KB)
    static CONTEXT: StaticCell<PovContext> = StaticCell::new();
    let context: &'static PovContext = CONTEXT.init_with(PovContext::new);

    let (frame_writer, frame_reader) = context
        .frames
        .split()
        .expect("Frame store handles already taken");

    // Hall-Sensor an GPIO4 → RotationTracker
    hall::install(peripherals.IO_MUX, peripherals.GPIO4, &context.tracker);

    // ------------------------------------------------------------------------
    // LED-Strips: SPI2 (Strip A) und SPI3 (Strip B), je mit eigenem DMA-Kanal
    // ------------------------------------------------------------------------

    let spi_a = Spi::new(peripherals.SPI2, spi_config())
        .expect("Failed to initialize SPI2")
        .with_sck(peripherals.GPIO12)
        .with_mosi(peripherals.GPIO11)
        .with_dma(peripherals.DMA_CH0);

    let spi_b = Spi::new(peripherals.SPI3, spi_config())
        .expect("Failed to initialize SPI3")
        .with_sck(peripherals.GPIO14)
        .with_mosi(peripherals.GPIO13)
        .with_dma(peripherals.DMA_CH1);

    let lanes = [
        StripLane::new(
            SpiStrip::new("A", spi_a),
            column_buffer!(),
            column_buffer!(),
        ),
        StripLane::new(
            SpiStrip::new("B", spi_b),
            column_buffer!(),
            column_buffer!(),
        ),
    ];

    let pipeline = ColumnPipeline::new(&context.tracker, frame_reader, lanes);
    let renderer = Renderer::new(frame_writer, &REGIONS, INACTIVE_COLOR);

    spawner
        .spawn(rotor_task(pipeline, &context.tracker, &context.status))
        .expect("Failed to spawn rotor task");

    // ------------------------------------------------------------------------
    // WiFi + Netzwerk-Stack
    // ------------------------------------------------------------------------

    static RADIO_INIT: StaticCell<esp_radio::Controller> = StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

    let (wifi_controller, wifi_interface) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    // Random seed für TCP/IP Stack (von Hardware RNG)
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // Sockets: Bild-Abruf (1) + HTTP-Server (HTTP_TASK_POOL_SIZE) + DNS/DHCP
    static RESOURCES: StaticCell<StackResources<6>> = StaticCell::new();
    let resources = RESOURCES.init(StackResources::new());

    let (stack, runner) = embassy_net::new(
        wifi_interface.sta,
        NetConfig::dhcpv4(Default::default()),
        resources,
        seed,
    );

    // Stack muss 'static sein für Tasks
    static STACK: StaticCell<Stack<'static>> = StaticCell::new();
    let stack = &*STACK.init(stack);

    spawner
        .spawn(connection_task(wifi_controller))
        .expect("Failed to spawn WiFi task");
    spawner
        .spawn(net_task(runner))
        .expect("Failed to spawn net task");
    spawner
        .spawn(dhcp_task(stack))
        .expect("Failed to spawn DHCP task");

    // Bild-Abruf → Renderer
    spawner
        .spawn(refresh_task(stack, renderer, &context.status))
        .expect("Failed to spawn refresh task");

    // Status-Server
    for task_id in 0..HTTP_TASK_POOL_SIZE {
        spawner
            .spawn(http_server_task(task_id, stack, context))
            .expect("Failed to spawn HTTP task");
    }

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
