//! Device model end to end against a scripted device.

mod common;

use common::FakeDevice;
use epductl::error::{IdentityField, ValidationError};
use epductl::{
    DeviceIdentity, Error, ModelRegistry, ObjectPath, ObjectStore, OutletAction, OutletOutcome,
    Pdu, SessionConfig, ShellSession,
};
use tokio_test::assert_ok;

const IDENTITY_COMMANDS: [&str; 4] = [
    "get PDU.PowerSummary.iSerialNumber",
    "get PDU.PowerSummary.iPartNumber",
    "get PDU.PowerSummary.iVersion",
    "get PDU.OutletSystem.Outlet.Count",
];

async fn connect(device: FakeDevice) -> Pdu<ShellSession<FakeDevice>> {
    let session = ShellSession::start(device, SessionConfig::default())
        .await
        .unwrap();
    let Ok(pdu) = Pdu::start(session, &ModelRegistry::builtin()).await else {
        panic!("identity discovery failed");
    };
    pdu
}

#[tokio::test(start_paused = true)]
async fn test_identity_discovered_in_order() {
    let device = FakeDevice::with_identity("AB12CD34EF", "EILB13", "01.02.2021", "24");
    let log = device.log();
    let mut pdu = connect(device).await;

    assert_eq!(
        pdu.identity(),
        &DeviceIdentity {
            serial_number: "AB12CD34EF".to_string(),
            part_number: "EILB13".to_string(),
            firmware_version: "01.02.2021".to_string(),
            outlet_count: 24,
        }
    );
    assert_eq!(pdu.outlet_count(), 24);
    assert_eq!(log.lock().unwrap().commands, IDENTITY_COMMANDS);

    assert_ok!(pdu.close().await);
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_model_logs_out() {
    let device = FakeDevice::with_identity("AB12CD34EF", "XX99", "01.02.2021", "24");
    let log = device.log();
    let session = ShellSession::start(device, SessionConfig::default())
        .await
        .unwrap();

    let Err(err) = Pdu::start(session, &ModelRegistry::builtin()).await else {
        panic!("unsupported model accepted");
    };
    match err {
        Error::Validation(e) => {
            assert_eq!(e.field(), IdentityField::PartNumber);
            assert_eq!(e.value(), "XX99");
        }
        other => panic!("unexpected error: {}", other),
    }

    let log = log.lock().unwrap();
    assert_eq!(log.commands.last().map(String::as_str), Some("quit"));
    assert!(!log.commands.iter().any(|c| c.starts_with("set ")));
    assert!(log.shutdown);
}

#[tokio::test(start_paused = true)]
async fn test_bad_firmware_reported_first() {
    let device = FakeDevice::with_identity("short", "XX99", "v1", "0");
    let session = ShellSession::start(device, SessionConfig::default())
        .await
        .unwrap();

    let Err(Error::Validation(err)) = Pdu::start(session, &ModelRegistry::builtin()).await else {
        panic!("invalid identity accepted");
    };
    assert_eq!(err, ValidationError::InvalidFirmwareVersion("v1".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_extra_model_accepted() {
    let device = FakeDevice::with_identity("AB12CD34EF", "EMAB07", "02.10.0031", "16");
    let session = ShellSession::start(device, SessionConfig::default())
        .await
        .unwrap();

    let mut models = ModelRegistry::builtin();
    models.register("EMAB07");
    let Ok(mut pdu) = Pdu::start(session, &models).await else {
        panic!("registered model rejected");
    };
    assert_eq!(pdu.identity().part_number, "EMAB07");
    pdu.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_apply_writes_only_valid_outlets() {
    let device = FakeDevice::with_identity("AB12CD34EF", "EILB13", "01.02.2021", "24")
        .reply("set PDU.OutletSystem.Outlet[1].DelayBeforeShutdown 0", "")
        .reply("set PDU.OutletSystem.Outlet[24].DelayBeforeShutdown 0", "");
    let log = device.log();
    let mut pdu = connect(device).await;

    let outcomes = pdu.apply(OutletAction::Off, &[0, 1, 24, 25]).await.unwrap();
    assert_eq!(
        outcomes,
        vec![
            OutletOutcome::NoSuchOutlet(0),
            OutletOutcome::Applied(1),
            OutletOutcome::Applied(24),
            OutletOutcome::NoSuchOutlet(25),
        ]
    );
    assert_eq!(outcomes[3].to_string(), "No such outlet: 25");

    pdu.close().await.unwrap();

    let log = log.lock().unwrap();
    assert_eq!(
        &log.commands[IDENTITY_COMMANDS.len()..],
        [
            "set PDU.OutletSystem.Outlet[1].DelayBeforeShutdown 0",
            "set PDU.OutletSystem.Outlet[24].DelayBeforeShutdown 0",
            "quit",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_power_on_wire_format() {
    let device = FakeDevice::with_identity("AB12CD34EF", "EMIH28", "01.02.2021", "8")
        .reply("set PDU.OutletSystem.Outlet[3].DelayBeforeStartup 0", "");
    let log = device.log();
    let mut pdu = connect(device).await;

    pdu.power_on(3).await.unwrap();
    pdu.close().await.unwrap();

    let log = log.lock().unwrap();
    let written = String::from_utf8_lossy(&log.written);
    assert!(written.ends_with("set PDU.OutletSystem.Outlet[3].DelayBeforeStartup 0\rquit\r"));
}

#[tokio::test(start_paused = true)]
async fn test_store_access_after_discovery() {
    let device = FakeDevice::with_identity("AB12CD34EF", "EILB14", "01.02.2021", "24")
        .reply("get PDU.OutletSystem.Outlet[2].PresentStatus.SwitchOnOff", "1");
    let mut pdu = connect(device).await;

    let path = ObjectPath::new("PDU.OutletSystem.Outlet[2].PresentStatus.SwitchOnOff");
    assert_eq!(pdu.store_mut().get(&path).await.unwrap(), "1");

    pdu.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_identity_json() {
    let device = FakeDevice::with_identity("AB12CD34EF", "EILB15", "01.02.2021", "12");
    let mut pdu = connect(device).await;

    let json = serde_json::to_value(pdu.identity()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "serial_number": "AB12CD34EF",
            "part_number": "EILB15",
            "firmware_version": "01.02.2021",
            "outlet_count": 12,
        })
    );

    pdu.close().await.unwrap();
}
