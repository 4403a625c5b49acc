/// Conversions between engine types and Vulkan types
///
/// Pure functions, no device access. Swapchain creation and surface queries
/// go through these so the mapping rules live in one place.

use ash::vk;
use galaxy_3d_surface::{engine_err, engine_error};
use galaxy_3d_surface::galaxy3d::render::{Format, PresentMode, TextureUsage};
use galaxy_3d_surface::galaxy3d::{Error, SurfaceInfo};

const LOG_SOURCE: &str = "galaxy3d::vulkan";

// ============================================================================
// Formats
// ============================================================================

/// Convert engine Format to Vulkan format
pub(crate) fn format_to_vk(format: Format) -> vk::Format {
    match format {
        Format::Undefined => vk::Format::UNDEFINED,
        Format::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        Format::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        Format::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        Format::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        Format::A2B10G10R10_UNORM => vk::Format::A2B10G10R10_UNORM_PACK32,
        Format::R16G16B16A16_SFLOAT => vk::Format::R16G16B16A16_SFLOAT,
    }
}

/// Convert Vulkan format to engine Format (`None` for formats the engine
/// does not expose)
pub(crate) fn vk_to_format(format: vk::Format) -> Option<Format> {
    match format {
        vk::Format::R8G8B8A8_UNORM => Some(Format::R8G8B8A8_UNORM),
        vk::Format::R8G8B8A8_SRGB => Some(Format::R8G8B8A8_SRGB),
        vk::Format::B8G8R8A8_UNORM => Some(Format::B8G8R8A8_UNORM),
        vk::Format::B8G8R8A8_SRGB => Some(Format::B8G8R8A8_SRGB),
        vk::Format::A2B10G10R10_UNORM_PACK32 => Some(Format::A2B10G10R10_UNORM),
        vk::Format::R16G16B16A16_SFLOAT => Some(Format::R16G16B16A16_SFLOAT),
        _ => None,
    }
}

/// Build the capability snapshot from the raw surface queries
///
/// Unknown formats are skipped and duplicates (one entry per color space)
/// collapsed. The preferred format is the first sRGB 8-bit format, else the
/// first supported one. Returns `formats` empty if nothing is usable.
pub(crate) fn surface_info_from(
    surface_formats: &[vk::SurfaceFormatKHR],
    supported_usage: vk::ImageUsageFlags,
) -> SurfaceInfo {
    let mut formats: Vec<Format> = Vec::new();
    for format in surface_formats.iter().filter_map(|f| vk_to_format(f.format)) {
        if !formats.contains(&format) {
            formats.push(format);
        }
    }

    let preferred_format = formats
        .iter()
        .copied()
        .find(|f| *f == Format::B8G8R8A8_SRGB || *f == Format::R8G8B8A8_SRGB)
        .or_else(|| formats.first().copied())
        .unwrap_or(Format::Undefined);

    SurfaceInfo {
        preferred_format,
        supported_usage: vk_to_usage(supported_usage),
        formats,
    }
}

/// Color space to pair with a format, SRGB_NONLINEAR when offered
pub(crate) fn choose_color_space(
    surface_formats: &[vk::SurfaceFormatKHR],
    format: vk::Format,
) -> Option<vk::ColorSpaceKHR> {
    let mut candidates = surface_formats.iter().filter(|f| f.format == format);
    let first = candidates.clone().next()?;
    Some(
        candidates
            .find(|f| f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR)
            .unwrap_or(first)
            .color_space,
    )
}

// ============================================================================
// Usage
// ============================================================================

/// Convert engine TextureUsage to Vulkan image usage
///
/// `PRESENT` has no image usage bit. If nothing else is requested the image
/// is created as a color attachment, which every surface supports.
pub(crate) fn usage_to_vk(usage: TextureUsage) -> vk::ImageUsageFlags {
    let mut flags = vk::ImageUsageFlags::empty();
    if usage.contains(TextureUsage::SHADER_RESOURCE) {
        flags |= vk::ImageUsageFlags::SAMPLED;
    }
    if usage.contains(TextureUsage::UNORDERED_ACCESS) {
        flags |= vk::ImageUsageFlags::STORAGE;
    }
    if usage.contains(TextureUsage::RENDER_TARGET) {
        flags |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
    }
    if usage.contains(TextureUsage::COPY_SOURCE) {
        flags |= vk::ImageUsageFlags::TRANSFER_SRC;
    }
    if usage.contains(TextureUsage::COPY_DESTINATION) {
        flags |= vk::ImageUsageFlags::TRANSFER_DST;
    }
    if flags.is_empty() {
        flags = vk::ImageUsageFlags::COLOR_ATTACHMENT;
    }
    flags
}

/// Convert Vulkan supported usage to engine TextureUsage
///
/// Swapchain images can always be presented, so `PRESENT` is always set.
pub(crate) fn vk_to_usage(flags: vk::ImageUsageFlags) -> TextureUsage {
    let mut usage = TextureUsage::PRESENT;
    if flags.contains(vk::ImageUsageFlags::SAMPLED) {
        usage |= TextureUsage::SHADER_RESOURCE;
    }
    if flags.contains(vk::ImageUsageFlags::STORAGE) {
        usage |= TextureUsage::UNORDERED_ACCESS;
    }
    if flags.contains(vk::ImageUsageFlags::COLOR_ATTACHMENT) {
        usage |= TextureUsage::RENDER_TARGET;
    }
    if flags.contains(vk::ImageUsageFlags::TRANSFER_SRC) {
        usage |= TextureUsage::COPY_SOURCE;
    }
    if flags.contains(vk::ImageUsageFlags::TRANSFER_DST) {
        usage |= TextureUsage::COPY_DESTINATION;
    }
    usage
}

// ============================================================================
// Present mode
// ============================================================================

pub(crate) fn present_mode_to_vk(mode: PresentMode) -> vk::PresentModeKHR {
    match mode {
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
    }
}

pub(crate) fn vk_to_present_mode(mode: vk::PresentModeKHR) -> Option<PresentMode> {
    match mode {
        vk::PresentModeKHR::FIFO => Some(PresentMode::Fifo),
        vk::PresentModeKHR::MAILBOX => Some(PresentMode::Mailbox),
        vk::PresentModeKHR::IMMEDIATE => Some(PresentMode::Immediate),
        _ => None,
    }
}

/// Vulkan present mode for a vsync policy among the modes the surface offers
pub(crate) fn choose_present_mode(vsync: bool, available: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    let supported: Vec<PresentMode> = available.iter().filter_map(|m| vk_to_present_mode(*m)).collect();
    present_mode_to_vk(PresentMode::select(vsync, &supported))
}

// ============================================================================
// Capabilities
// ============================================================================

/// Clamp the requested size into the surface's extent range
pub(crate) fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, width: u32, height: u32) -> vk::Extent2D {
    vk::Extent2D {
        width: width.clamp(caps.min_image_extent.width, caps.max_image_extent.width.max(caps.min_image_extent.width)),
        height: height.clamp(caps.min_image_extent.height, caps.max_image_extent.height.max(caps.min_image_extent.height)),
    }
}

/// Clamp the image count hint into `[min_image_count, max_image_count]`
/// (`max_image_count == 0` means no upper bound)
pub(crate) fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR, desired: u32) -> u32 {
    let count = desired.max(caps.min_image_count);
    if caps.max_image_count > 0 {
        count.min(caps.max_image_count)
    } else {
        count
    }
}

/// First composite alpha mode the surface supports, opaque preferred
pub(crate) fn choose_composite_alpha(caps: &vk::SurfaceCapabilitiesKHR) -> vk::CompositeAlphaFlagsKHR {
    [
        vk::CompositeAlphaFlagsKHR::OPAQUE,
        vk::CompositeAlphaFlagsKHR::INHERIT,
        vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED,
        vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED,
    ]
    .into_iter()
    .find(|mode| caps.supported_composite_alpha.contains(*mode))
    .unwrap_or(vk::CompositeAlphaFlagsKHR::OPAQUE)
}

// ============================================================================
// Errors
// ============================================================================

/// Map a failed Vulkan call to an engine error
///
/// Out-of-date is returned silently (callers decide how loud it is). Lost
/// surfaces become `UnsupportedSurface`, exhausted memory `OutOfMemory`, and
/// everything else a logged `BackendError`.
pub(crate) fn map_vk_error(call: &str, result: vk::Result) -> Error {
    match result {
        vk::Result::ERROR_OUT_OF_DATE_KHR => Error::OutOfDateSurface,
        vk::Result::ERROR_SURFACE_LOST_KHR | vk::Result::ERROR_NATIVE_WINDOW_IN_USE_KHR => {
            engine_error!(LOG_SOURCE, "{} failed: {:?}", call, result);
            Error::UnsupportedSurface(format!("{} failed: {:?}", call, result))
        }
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            engine_error!(LOG_SOURCE, "{} failed: {:?}", call, result);
            Error::OutOfMemory
        }
        _ => engine_err!(LOG_SOURCE, "{} failed: {:?}", call, result),
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
