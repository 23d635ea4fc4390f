//! JNI utilities for Android platform
//!
//! Soft keyboard, display metrics and audible feedback go through the Java
//! framework. android-activity's own `show_soft_input` does not work with
//! NativeActivity, so the keyboard calls the `InputMethodManager` directly.

use flare_platform::BeepKind;

#[cfg(target_os = "android")]
use android_activity::AndroidApp;

#[cfg(target_os = "android")]
use flare_platform::{PlatformError, Rect, Result};

#[cfg(target_os = "android")]
use jni::{
    objects::{GlobalRef, JObject, JValue},
    JNIEnv, JavaVM,
};

#[cfg(target_os = "android")]
use tracing::debug;

/// `InputMethodManager.SHOW_IMPLICIT`
const SHOW_IMPLICIT: i32 = 1;

/// `AudioManager.STREAM_NOTIFICATION`
#[cfg(target_os = "android")]
const STREAM_NOTIFICATION: i32 = 5;

/// Beep volume, percent of the stream volume
#[cfg(target_os = "android")]
const TONE_VOLUME: i32 = 80;

/// Beep length in milliseconds
#[cfg(target_os = "android")]
const TONE_DURATION_MS: i32 = 150;

/// `ToneGenerator.TONE_*` constant for a beep kind
pub fn tone_for(kind: BeepKind) -> i32 {
    match kind {
        // TONE_PROP_BEEP
        BeepKind::Default => 24,
        // TONE_PROP_ACK
        BeepKind::Message | BeepKind::Notification => 25,
        // TONE_PROP_NACK
        BeepKind::Error => 26,
        // TONE_PROP_PROMPT
        BeepKind::Question => 27,
        // TONE_PROP_BEEP2
        BeepKind::Password => 28,
    }
}

/// Soft keyboard flags for `showSoftInput`
pub fn show_flags(implicit: bool) -> i32 {
    if implicit {
        SHOW_IMPLICIT
    } else {
        0
    }
}

/// Attach to the VM and run `f` with the activity object
///
/// A pending Java exception is cleared and reported as an error.
#[cfg(target_os = "android")]
fn with_activity<T>(
    app: &AndroidApp,
    f: impl FnOnce(&mut JNIEnv, &JObject) -> std::result::Result<T, jni::errors::Error>,
) -> Result<T> {
    let vm = unsafe { JavaVM::from_raw(app.vm_as_ptr() as *mut _) }
        .map_err(|e| PlatformError::Jni(format!("failed to get JavaVM: {e:?}")))?;
    let mut env = vm
        .attach_current_thread()
        .map_err(|e| PlatformError::Jni(format!("failed to attach JNI thread: {e:?}")))?;

    let ptr = app.activity_as_ptr();
    if ptr.is_null() {
        return Err(PlatformError::Jni("activity pointer is null".to_string()));
    }
    let activity = unsafe { JObject::from_raw(ptr as *mut _) };

    let result = f(&mut env, &activity);
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
        return Err(PlatformError::Jni("java exception".to_string()));
    }
    result.map_err(|e| PlatformError::Jni(e.to_string()))
}

#[cfg(target_os = "android")]
fn input_method_manager<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject,
) -> std::result::Result<JObject<'local>, jni::errors::Error> {
    let context = env.find_class("android/content/Context")?;
    let service = env
        .get_static_field(context, "INPUT_METHOD_SERVICE", "Ljava/lang/String;")?
        .l()?;
    env.call_method(
        activity,
        "getSystemService",
        "(Ljava/lang/String;)Ljava/lang/Object;",
        &[JValue::Object(&service)],
    )?
    .l()
}

#[cfg(target_os = "android")]
fn decor_view<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject,
) -> std::result::Result<JObject<'local>, jni::errors::Error> {
    let window = env
        .call_method(activity, "getWindow", "()Landroid/view/Window;", &[])?
        .l()?;
    env.call_method(&window, "getDecorView", "()Landroid/view/View;", &[])?
        .l()
}

/// Show the soft keyboard via `InputMethodManager.showSoftInput`
#[cfg(target_os = "android")]
pub fn show_soft_input(app: &AndroidApp, implicit: bool) -> Result<()> {
    with_activity(app, |env, activity| {
        let manager = input_method_manager(env, activity)?;
        let view = decor_view(env, activity)?;
        env.call_method(
            &manager,
            "showSoftInput",
            "(Landroid/view/View;I)Z",
            &[JValue::Object(&view), JValue::Int(show_flags(implicit))],
        )?;
        Ok(())
    })
}

/// Hide the soft keyboard via `InputMethodManager.hideSoftInputFromWindow`
#[cfg(target_os = "android")]
pub fn hide_soft_input(app: &AndroidApp) -> Result<()> {
    with_activity(app, |env, activity| {
        let manager = input_method_manager(env, activity)?;
        let view = decor_view(env, activity)?;
        let token = env
            .call_method(&view, "getWindowToken", "()Landroid/os/IBinder;", &[])?
            .l()?;
        env.call_method(
            &manager,
            "hideSoftInputFromWindow",
            "(Landroid/os/IBinder;I)Z",
            &[JValue::Object(&token), JValue::Int(0)],
        )?;
        Ok(())
    })
}

/// Display size in pixels from `Resources.getDisplayMetrics()`
#[cfg(target_os = "android")]
pub fn display_bounds(app: &AndroidApp) -> Result<Rect> {
    let (w, h) = with_activity(app, |env, activity| {
        let resources = env
            .call_method(
                activity,
                "getResources",
                "()Landroid/content/res/Resources;",
                &[],
            )?
            .l()?;
        let metrics = env
            .call_method(
                &resources,
                "getDisplayMetrics",
                "()Landroid/util/DisplayMetrics;",
                &[],
            )?
            .l()?;
        let w = env.get_field(&metrics, "widthPixels", "I")?.i()?;
        let h = env.get_field(&metrics, "heightPixels", "I")?.i()?;
        Ok((w, h))
    })?;
    debug!("Display size: {}x{}", w, h);
    Ok(Rect::new(0, 0, w, h))
}

/// Audible feedback through one `android.media.ToneGenerator`
///
/// The generator holds a native AudioTrack, so it is created on the first
/// beep, reused afterwards and released explicitly.
#[cfg(target_os = "android")]
#[derive(Default)]
pub struct TonePlayer {
    generator: Option<GlobalRef>,
}

#[cfg(target_os = "android")]
impl TonePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play a short tone, creating the generator if needed
    pub fn play(&mut self, app: &AndroidApp, kind: BeepKind) -> Result<()> {
        let cached = &mut self.generator;
        with_activity(app, |env, _activity| {
            let generator = match cached.clone() {
                Some(generator) => generator,
                None => {
                    let local = env.new_object(
                        "android/media/ToneGenerator",
                        "(II)V",
                        &[JValue::Int(STREAM_NOTIFICATION), JValue::Int(TONE_VOLUME)],
                    )?;
                    let global = env.new_global_ref(local)?;
                    *cached = Some(global.clone());
                    global
                }
            };
            env.call_method(
                &generator,
                "startTone",
                "(II)Z",
                &[JValue::Int(tone_for(kind)), JValue::Int(TONE_DURATION_MS)],
            )?;
            Ok(())
        })
    }

    /// Free the generator's native resources; a later beep creates a new one
    pub fn release(&mut self, app: &AndroidApp) -> Result<()> {
        let Some(generator) = self.generator.take() else {
            return Ok(());
        };
        with_activity(app, |env, _activity| {
            env.call_method(&generator, "release", "()V", &[])?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tones_differ_for_error_and_default() {
        assert_ne!(tone_for(BeepKind::Error), tone_for(BeepKind::Default));
        assert_eq!(tone_for(BeepKind::Message), tone_for(BeepKind::Notification));
    }

    #[test]
    fn test_show_flags() {
        assert_eq!(show_flags(true), SHOW_IMPLICIT);
        assert_eq!(show_flags(false), 0);
    }
}
