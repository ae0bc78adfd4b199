// [libs/shared/telemetry/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TELEMETRY SENTINEL (V1.0)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L0)
 * RESPONSABILIDAD: TRAZADO ESTRUCTURADO Y CAPTURA DE PÁNICOS
 *
 * Inicializa un único suscriptor `tracing` global para todo binario
 * de Aegis Hub (API, dispatch worker). En desarrollo emite líneas
 * compactas y coloreadas; en producción emite JSON aplanado para
 * ingesta por el agregador de logs.
 * =================================================================
 */

use std::panic;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as formatting_layer, EnvFilter};

/// Inicializa el sistema de trazas y el hook de pánico soberano.
///
/// Seguro de invocar una sola vez por proceso; una segunda invocación
/// en el mismo runtime entrará en pánico (comportamiento heredado de
/// `tracing_subscriber::registry().init()`), lo cual es intencional:
/// cada binario llama a esto exactamente una vez desde `main`.
pub fn init_tracing(service_nominal_identifier: &str) {
    let environmental_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{}={level},tower_http=warn,hyper=warn,libsql=error",
            service_nominal_identifier,
            level = if cfg!(debug_assertions) { "debug" } else { "info" }
        )
        .into()
    });

    let is_production_strata = !cfg!(debug_assertions);

    if is_production_strata {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(formatting_layer::layer().json().flatten_event(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(formatting_layer::layer().compact().with_target(false))
            .init();
    }

    let service_id_snapshot = service_nominal_identifier.to_string();
    panic::set_hook(Box::new(move |panic_metadata| {
        let panic_location = panic_metadata
            .location()
            .map(|location| format!("{}:{}:{}", location.file(), location.line(), location.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let panic_payload_message = panic_metadata
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_metadata.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("<no payload>");

        tracing::error!(
            target: "panic_monitor",
            service = %service_id_snapshot,
            location = %panic_location,
            "🔥 [CRITICAL_PANIC]: thread terminated abruptly: {}",
            panic_payload_message
        );
    }));

    tracing::info!("👁️  [TELEMETRY_ONLINE]: observability initialised for [{}]", service_nominal_identifier);
}
