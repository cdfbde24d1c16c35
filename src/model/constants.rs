//! Framework class names and lifecycle method subsignatures.
//!
//! The lifecycle lists are the methods a role driver places at fixed positions of
//! its state machine. Callbacks matching one of these for the owning role are not
//! dispatched a second time as generic callbacks.

/// Base class of all activities
pub const ACTIVITY_CLASS: &str = "android.app.Activity";
/// Map activity base class, treated as an activity
pub const MAP_ACTIVITY_CLASS: &str = "com.google.android.maps.MapActivity";
/// Base class of all services
pub const SERVICE_CLASS: &str = "android.app.Service";
/// Legacy cloud-messaging intent service
pub const GCM_BASE_INTENT_SERVICE_CLASS: &str = "com.google.android.gcm.GCMBaseIntentService";
/// Cloud-messaging listener service
pub const GCM_LISTENER_SERVICE_CLASS: &str = "com.google.android.gms.gcm.GcmListenerService";
/// Base class of all broadcast receivers
pub const BROADCAST_RECEIVER_CLASS: &str = "android.content.BroadcastReceiver";
/// Base class of all content providers
pub const CONTENT_PROVIDER_CLASS: &str = "android.content.ContentProvider";
/// Base class of the application singleton
pub const APPLICATION_CLASS: &str = "android.app.Application";
/// Platform fragment base class
pub const FRAGMENT_CLASS: &str = "android.app.Fragment";
/// Support-library fragment base class
pub const SUPPORT_FRAGMENT_CLASS: &str = "android.support.v4.app.Fragment";
/// Jetpack fragment base class
pub const ANDROIDX_FRAGMENT_CLASS: &str = "androidx.fragment.app.Fragment";
/// Interface implemented by service connections
pub const SERVICE_CONNECTION_INTERFACE: &str = "android.content.ServiceConnection";
/// Interface of application-wide activity lifecycle listeners
pub const ACTIVITY_LIFECYCLE_CALLBACKS_INTERFACE: &str =
    "android.app.Application$ActivityLifecycleCallbacks";
/// Root of the class hierarchy
pub const OBJECT_CLASS: &str = "java.lang.Object";
/// Parameter type of every component driver
pub const INTENT_CLASS: &str = "android.content.Intent";

/// Default class receiving the published application instance
pub const APPLICATION_HOLDER_CLASS: &str = "il.ac.tau.MyApplicationHolder";
/// Default field receiving the published application instance
pub const APPLICATION_HOLDER_FIELD: &str = "application";

/// Activity `onCreate` subsignature
pub const ACTIVITY_ONCREATE: &str = "void onCreate(android.os.Bundle)";
/// Activity `onStart` subsignature
pub const ACTIVITY_ONSTART: &str = "void onStart()";
/// Activity `onRestoreInstanceState` subsignature
pub const ACTIVITY_ONRESTOREINSTANCESTATE: &str = "void onRestoreInstanceState(android.os.Bundle)";
/// Activity `onPostCreate` subsignature
pub const ACTIVITY_ONPOSTCREATE: &str = "void onPostCreate(android.os.Bundle)";
/// Activity `onResume` subsignature
pub const ACTIVITY_ONRESUME: &str = "void onResume()";
/// Activity `onPostResume` subsignature
pub const ACTIVITY_ONPOSTRESUME: &str = "void onPostResume()";
/// Activity `onCreateDescription` subsignature
pub const ACTIVITY_ONCREATEDESCRIPTION: &str = "java.lang.CharSequence onCreateDescription()";
/// Activity `onSaveInstanceState` subsignature
pub const ACTIVITY_ONSAVEINSTANCESTATE: &str = "void onSaveInstanceState(android.os.Bundle)";
/// Activity `onPause` subsignature
pub const ACTIVITY_ONPAUSE: &str = "void onPause()";
/// Activity `onStop` subsignature
pub const ACTIVITY_ONSTOP: &str = "void onStop()";
/// Activity `onRestart` subsignature
pub const ACTIVITY_ONRESTART: &str = "void onRestart()";
/// Activity `onDestroy` subsignature
pub const ACTIVITY_ONDESTROY: &str = "void onDestroy()";
/// Activity `onAttachFragment` subsignature
pub const ACTIVITY_ONATTACHFRAGMENT: &str = "void onAttachFragment(android.app.Fragment)";

/// Service `onCreate` subsignature
pub const SERVICE_ONCREATE: &str = "void onCreate()";
/// Service `onStart` subsignature
pub const SERVICE_ONSTART: &str = "void onStart(android.content.Intent,int)";
/// Service `onStartCommand` subsignature
pub const SERVICE_ONSTARTCOMMAND: &str = "int onStartCommand(android.content.Intent,int,int)";
/// Service `onBind` subsignature
pub const SERVICE_ONBIND: &str = "android.os.IBinder onBind(android.content.Intent)";
/// Service `onRebind` subsignature
pub const SERVICE_ONREBIND: &str = "void onRebind(android.content.Intent)";
/// Service `onUnbind` subsignature
pub const SERVICE_ONUNBIND: &str = "boolean onUnbind(android.content.Intent)";
/// Service `onDestroy` subsignature
pub const SERVICE_ONDESTROY: &str = "void onDestroy()";

/// Cloud-messaging intent service messaging methods
pub const GCM_INTENT_SERVICE_METHODS: &[&str] = &[
    "void onDeletedMessages(android.content.Context,int)",
    "void onError(android.content.Context,java.lang.String)",
    "void onMessage(android.content.Context,android.content.Intent)",
    "void onRecoverableError(android.content.Context,java.lang.String)",
    "void onRegistered(android.content.Context,java.lang.String)",
    "void onUnregistered(android.content.Context,java.lang.String)",
];

/// Cloud-messaging listener service messaging methods
pub const GCM_LISTENER_SERVICE_METHODS: &[&str] = &[
    "void onDeletedMessages()",
    "void onMessageReceived(java.lang.String,android.os.Bundle)",
    "void onMessageSent(java.lang.String)",
    "void onSendError(java.lang.String,java.lang.String)",
];

/// Fragment `onAttach` subsignature
pub const FRAGMENT_ONATTACH: &str = "void onAttach(android.app.Activity)";
/// Fragment `onCreate` subsignature
pub const FRAGMENT_ONCREATE: &str = "void onCreate(android.os.Bundle)";
/// Fragment `onCreateView` subsignature
pub const FRAGMENT_ONCREATEVIEW: &str =
    "android.view.View onCreateView(android.view.LayoutInflater,android.view.ViewGroup,android.os.Bundle)";
/// Fragment `onViewCreated` subsignature
pub const FRAGMENT_ONVIEWCREATED: &str = "void onViewCreated(android.view.View,android.os.Bundle)";
/// Fragment `onActivityCreated` subsignature
pub const FRAGMENT_ONACTIVITYCREATED: &str = "void onActivityCreated(android.os.Bundle)";
/// Fragment `onStart` subsignature
pub const FRAGMENT_ONSTART: &str = "void onStart()";
/// Fragment `onResume` subsignature
pub const FRAGMENT_ONRESUME: &str = "void onResume()";
/// Fragment `onPause` subsignature
pub const FRAGMENT_ONPAUSE: &str = "void onPause()";
/// Fragment `onSaveInstanceState` subsignature
pub const FRAGMENT_ONSAVEINSTANCESTATE: &str = "void onSaveInstanceState(android.os.Bundle)";
/// Fragment `onStop` subsignature
pub const FRAGMENT_ONSTOP: &str = "void onStop()";
/// Fragment `onDestroyView` subsignature
pub const FRAGMENT_ONDESTROYVIEW: &str = "void onDestroyView()";
/// Fragment `onDestroy` subsignature
pub const FRAGMENT_ONDESTROY: &str = "void onDestroy()";
/// Fragment `onDetach` subsignature
pub const FRAGMENT_ONDETACH: &str = "void onDetach()";

/// Broadcast receiver `onReceive` subsignature
pub const BROADCAST_ONRECEIVE: &str = "void onReceive(android.content.Context,android.content.Intent)";

/// Content provider `onCreate` subsignature
pub const CONTENTPROVIDER_ONCREATE: &str = "boolean onCreate()";
/// Content provider `insert` subsignature
pub const CONTENTPROVIDER_INSERT: &str =
    "android.net.Uri insert(android.net.Uri,android.content.ContentValues)";
/// Content provider `query` subsignature
pub const CONTENTPROVIDER_QUERY: &str = "android.database.Cursor query(android.net.Uri,java.lang.String[],java.lang.String,java.lang.String[],java.lang.String)";
/// Content provider `update` subsignature
pub const CONTENTPROVIDER_UPDATE: &str =
    "int update(android.net.Uri,android.content.ContentValues,java.lang.String,java.lang.String[])";
/// Content provider `delete` subsignature
pub const CONTENTPROVIDER_DELETE: &str =
    "int delete(android.net.Uri,java.lang.String,java.lang.String[])";
/// Content provider `getType` subsignature
pub const CONTENTPROVIDER_GETTYPE: &str = "java.lang.String getType(android.net.Uri)";

/// Application `onCreate` subsignature
pub const APPLICATION_ONCREATE: &str = "void onCreate()";
/// Application `onTerminate` subsignature
pub const APPLICATION_ONTERMINATE: &str = "void onTerminate()";

/// Service connection `onServiceConnected` subsignature
pub const SERVICECONNECTION_ONSERVICECONNECTED: &str =
    "void onServiceConnected(android.content.ComponentName,android.os.IBinder)";
/// Service connection `onServiceDisconnected` subsignature
pub const SERVICECONNECTION_ONSERVICEDISCONNECTED: &str =
    "void onServiceDisconnected(android.content.ComponentName)";

/// Activity lifecycle listener `onActivityCreated` subsignature
pub const ACTIVITYLIFECYCLECALLBACK_ONACTIVITYCREATED: &str =
    "void onActivityCreated(android.app.Activity,android.os.Bundle)";
/// Activity lifecycle listener `onActivityStarted` subsignature
pub const ACTIVITYLIFECYCLECALLBACK_ONACTIVITYSTARTED: &str = "void onActivityStarted(android.app.Activity)";
/// Activity lifecycle listener `onActivityResumed` subsignature
pub const ACTIVITYLIFECYCLECALLBACK_ONACTIVITYRESUMED: &str = "void onActivityResumed(android.app.Activity)";
/// Activity lifecycle listener `onActivityPaused` subsignature
pub const ACTIVITYLIFECYCLECALLBACK_ONACTIVITYPAUSED: &str = "void onActivityPaused(android.app.Activity)";
/// Activity lifecycle listener `onActivityStopped` subsignature
pub const ACTIVITYLIFECYCLECALLBACK_ONACTIVITYSTOPPED: &str = "void onActivityStopped(android.app.Activity)";
/// Activity lifecycle listener `onActivitySaveInstanceState` subsignature
pub const ACTIVITYLIFECYCLECALLBACK_ONACTIVITYSAVEINSTANCESTATE: &str =
    "void onActivitySaveInstanceState(android.app.Activity,android.os.Bundle)";
/// Activity lifecycle listener `onActivityDestroyed` subsignature
pub const ACTIVITYLIFECYCLECALLBACK_ONACTIVITYDESTROYED: &str =
    "void onActivityDestroyed(android.app.Activity)";

/// Package prefixes of platform and well-known library code.
///
/// Methods resolving into these packages are never called from a driver: their
/// behavior is modelled by the analysis, not synthesized.
pub const SYSTEM_PACKAGES: &[&str] = &[
    "android.",
    "androidx.",
    "java.",
    "javax.",
    "sun.",
    "org.omg.",
    "org.w3c.dom.",
    "com.google.",
    "com.android.",
];

/// Activity lifecycle methods
pub const ACTIVITY_LIFECYCLE_METHODS: &[&str] = &[
    ACTIVITY_ONCREATE,
    ACTIVITY_ONDESTROY,
    ACTIVITY_ONPAUSE,
    ACTIVITY_ONRESTART,
    ACTIVITY_ONRESUME,
    ACTIVITY_ONSTART,
    ACTIVITY_ONSTOP,
    ACTIVITY_ONSAVEINSTANCESTATE,
    ACTIVITY_ONRESTOREINSTANCESTATE,
    ACTIVITY_ONCREATEDESCRIPTION,
    ACTIVITY_ONPOSTCREATE,
    ACTIVITY_ONPOSTRESUME,
];

/// Service lifecycle methods
pub const SERVICE_LIFECYCLE_METHODS: &[&str] = &[
    SERVICE_ONCREATE,
    SERVICE_ONDESTROY,
    SERVICE_ONSTART,
    SERVICE_ONSTARTCOMMAND,
    SERVICE_ONBIND,
    SERVICE_ONREBIND,
    SERVICE_ONUNBIND,
];

/// Fragment lifecycle methods
pub const FRAGMENT_LIFECYCLE_METHODS: &[&str] = &[
    FRAGMENT_ONCREATE,
    FRAGMENT_ONDESTROY,
    FRAGMENT_ONPAUSE,
    FRAGMENT_ONATTACH,
    FRAGMENT_ONDESTROYVIEW,
    FRAGMENT_ONRESUME,
    FRAGMENT_ONSTART,
    FRAGMENT_ONSTOP,
    FRAGMENT_ONSAVEINSTANCESTATE,
    FRAGMENT_ONCREATEVIEW,
    FRAGMENT_ONACTIVITYCREATED,
    FRAGMENT_ONVIEWCREATED,
    FRAGMENT_ONDETACH,
];

/// Broadcast receiver lifecycle methods
pub const BROADCAST_LIFECYCLE_METHODS: &[&str] = &[BROADCAST_ONRECEIVE];

/// Content provider lifecycle methods
pub const CONTENTPROVIDER_LIFECYCLE_METHODS: &[&str] = &[
    CONTENTPROVIDER_ONCREATE,
    CONTENTPROVIDER_DELETE,
    CONTENTPROVIDER_GETTYPE,
    CONTENTPROVIDER_INSERT,
    CONTENTPROVIDER_QUERY,
    CONTENTPROVIDER_UPDATE,
];

/// Application lifecycle methods
pub const APPLICATION_LIFECYCLE_METHODS: &[&str] = &[APPLICATION_ONCREATE, APPLICATION_ONTERMINATE];

/// Service connection lifecycle methods
pub const SERVICECONNECTION_LIFECYCLE_METHODS: &[&str] = &[
    SERVICECONNECTION_ONSERVICECONNECTED,
    SERVICECONNECTION_ONSERVICEDISCONNECTED,
];

/// Methods of the activity lifecycle listener interface
pub const ACTIVITY_LIFECYCLE_CALLBACK_METHODS: &[&str] = &[
    ACTIVITYLIFECYCLECALLBACK_ONACTIVITYCREATED,
    ACTIVITYLIFECYCLECALLBACK_ONACTIVITYSTARTED,
    ACTIVITYLIFECYCLECALLBACK_ONACTIVITYRESUMED,
    ACTIVITYLIFECYCLECALLBACK_ONACTIVITYPAUSED,
    ACTIVITYLIFECYCLECALLBACK_ONACTIVITYSTOPPED,
    ACTIVITYLIFECYCLECALLBACK_ONACTIVITYSAVEINSTANCESTATE,
    ACTIVITYLIFECYCLECALLBACK_ONACTIVITYDESTROYED,
];
