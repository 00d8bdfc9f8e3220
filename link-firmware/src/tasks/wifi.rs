// WiFi Tasks - Access Point, Netzwerk-Stack und DHCP-Server
use alloc::string::String;
use core::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use defmt::{Debug2Format, error, info, warn};
use edge_dhcp::io::{self, DEFAULT_SERVER_PORT};
use edge_dhcp::server::{Server, ServerOptions};
use edge_nal::UdpBind;
use edge_nal_embassy::{Udp, UdpBuffers};
use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{
    AccessPointConfig, AuthMethod, ModeConfig, WifiController, WifiDevice, WifiEvent,
};

use crate::config::{
    AP_IP, AP_RESTART_DELAY_SECS, DHCP_MAX_LEASES, DHCP_PACKET_BUFFER_SIZE, DHCP_RESTART_DELAY_MS,
};

/// Access Point Task
///
/// Startet den Access Point und startet ihn nach einem Stop neu.
/// Jedes Gerät spannt sein eigenes Netz auf (kein Router nötig).
#[embassy_executor::task]
pub async fn access_point_task(
    mut controller: WifiController<'static>,
    ssid: &'static str,
    password: &'static str,
) {
    info!("WiFi: Starting access point task");

    loop {
        if !matches!(controller.is_started(), Ok(true)) {
            info!("WiFi: Configuring access point '{}'...", ssid);

            let ap_config = ModeConfig::AccessPoint(
                AccessPointConfig::default()
                    .with_ssid(String::from(ssid))
                    .with_password(String::from(password))
                    .with_auth_method(AuthMethod::Wpa2Personal),
            );

            if let Err(e) = controller.set_config(&ap_config) {
                error!("WiFi: Failed to set configuration: {}", Debug2Format(&e));
                Timer::after(Duration::from_secs(AP_RESTART_DELAY_SECS)).await;
                continue;
            }

            if let Err(e) = controller.start_async().await {
                error!("WiFi: Failed to start: {}", Debug2Format(&e));
                Timer::after(Duration::from_secs(AP_RESTART_DELAY_SECS)).await;
                continue;
            }

            info!("WiFi: Access point '{}' up at {}", ssid, Debug2Format(&AP_IP));
        }

        controller.wait_for_event(WifiEvent::ApStop).await;
        warn!("WiFi: Access point stopped, will restart...");

        Timer::after(Duration::from_secs(AP_RESTART_DELAY_SECS)).await;
    }
}

/// Network Task
///
/// Prozessiert Netzwerk-Pakete des embassy-net Stacks
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// DHCP-Server Task
///
/// Vergibt Adressen im 192.168.4.0/24 Netz, Gateway ist das Gerät selbst.
#[embassy_executor::task]
pub async fn dhcp_server_task(stack: &'static Stack<'static>) {
    let mut buf = [0u8; DHCP_PACKET_BUFFER_SIZE];
    let mut gw_buf = [Ipv4Addr::UNSPECIFIED];

    stack.wait_link_up().await;
    info!("DHCP: Link is up, starting server");

    let buffers = UdpBuffers::<2, 1024, 1024, 4>::new();
    let udp = Udp::new(*stack, &buffers);
    let mut socket = match udp
        .bind(SocketAddr::V4(SocketAddrV4::new(
            Ipv4Addr::UNSPECIFIED,
            DEFAULT_SERVER_PORT,
        )))
        .await
    {
        Ok(socket) => socket,
        Err(e) => {
            error!("DHCP: Failed to bind port {}: {}", DEFAULT_SERVER_PORT, Debug2Format(&e));
            return;
        }
    };

    let mut server = Server::<_, DHCP_MAX_LEASES>::new_with_et(AP_IP);

    loop {
        if let Err(e) = io::server::run(
            &mut server,
            &ServerOptions::new(AP_IP, Some(&mut gw_buf)),
            &mut socket,
            &mut buf,
        )
        .await
        {
            warn!("DHCP: Server error: {}", Debug2Format(&e));
        }
        Timer::after(Duration::from_millis(DHCP_RESTART_DELAY_MS)).await;
    }
}
