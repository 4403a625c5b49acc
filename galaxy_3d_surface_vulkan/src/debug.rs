/// Vulkan Debug Messenger - Routes validation layer messages to the engine logger
///
/// Only compiled with the `vulkan-validation` feature.

use ash::vk;
use galaxy_3d_surface::galaxy3d::render::{Config, DebugSeverity};
use galaxy_3d_surface::galaxy3d::{Error, Result};
use galaxy_3d_surface::{engine_error, engine_info, engine_trace, engine_warn};
use std::borrow::Cow;
use std::ffi::CStr;
use std::sync::{Mutex, PoisonError};

const LOG_SOURCE: &str = "galaxy3d::vulkan::validation";

/// Global debug configuration (shared across callbacks)
static DEBUG_CONFIG: Mutex<Option<DebugConfig>> = Mutex::new(None);

/// Debug configuration for the callback
#[derive(Clone, Copy)]
struct DebugConfig {
    break_on_error: bool,
}

/// Validation layer enabled on the instance
pub(crate) const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Severity flags the messenger subscribes to
pub(crate) fn severity_flags(severity: DebugSeverity) -> vk::DebugUtilsMessageSeverityFlagsEXT {
    match severity {
        DebugSeverity::ErrorsOnly => vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        DebugSeverity::ErrorsAndWarnings => {
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
        }
        DebugSeverity::All => {
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
        }
    }
}

/// Create the debug messenger for `config` on a freshly created instance
pub(crate) fn create_debug_messenger(
    entry: &ash::Entry,
    instance: &ash::Instance,
    config: &Config,
) -> Result<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)> {
    *DEBUG_CONFIG.lock().unwrap_or_else(PoisonError::into_inner) = Some(DebugConfig {
        break_on_error: config.break_on_validation_error,
    });

    let debug_utils = ash::ext::debug_utils::Instance::new(entry, instance);
    let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(severity_flags(config.debug_severity))
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(vulkan_debug_callback));

    let messenger = unsafe { debug_utils.create_debug_utils_messenger(&debug_info, None) }
        .map_err(|e| {
            engine_error!("galaxy3d::vulkan", "Failed to create debug messenger: {:?}", e);
            Error::Construction(format!("Failed to create debug messenger: {:?}", e))
        })?;

    Ok((debug_utils, messenger))
}

/// Stop forwarding messages (called before the messenger is destroyed)
pub(crate) fn cleanup_debug_config() {
    *DEBUG_CONFIG.lock().unwrap_or_else(PoisonError::into_inner) = None;
}

/// Vulkan debug messenger callback
///
/// Called by the validation layers. Forwards each message to the engine
/// logger at the matching severity.
unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    let Some(config) = *DEBUG_CONFIG.lock().unwrap_or_else(PoisonError::into_inner) else {
        return vk::FALSE;
    };
    let Some(callback_data) = p_callback_data.as_ref() else {
        return vk::FALSE;
    };

    let message_id_name = if callback_data.p_message_id_name.is_null() {
        Cow::Borrowed("Unknown")
    } else {
        CStr::from_ptr(callback_data.p_message_id_name).to_string_lossy()
    };
    let message = if callback_data.p_message.is_null() {
        Cow::Borrowed("No message")
    } else {
        CStr::from_ptr(callback_data.p_message).to_string_lossy()
    };

    let type_str = if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else {
        "General"
    };

    if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        engine_error!(LOG_SOURCE, "[{}] {}: {}", type_str, message_id_name, message);
        if config.break_on_error {
            engine_error!(LOG_SOURCE, "Break on validation error, aborting");
            std::process::abort();
        }
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        engine_warn!(LOG_SOURCE, "[{}] {}: {}", type_str, message_id_name, message);
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        engine_info!(LOG_SOURCE, "[{}] {}: {}", type_str, message_id_name, message);
    } else {
        engine_trace!(LOG_SOURCE, "[{}] {}: {}", type_str, message_id_name, message);
    }

    vk::FALSE
}
